use std::collections::BTreeSet;

use regex::Regex;
use thiserror::Error;

use crate::rules::ValidationRule;
use crate::spec::form::FormSpec;

/// Authoring mistakes in a form definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("question id '{0}' is defined more than once")]
    DuplicateId(String),
    #[error("question '{question_id}' skip condition references unknown question '{field}'")]
    UnknownReference { question_id: String, field: String },
    #[error("question '{question_id}' has an invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        question_id: String,
        pattern: String,
        reason: String,
    },
    #[error("question '{question_id}' requires at least {min} but at most {max} characters")]
    InvalidLengthBounds {
        question_id: String,
        min: usize,
        max: usize,
    },
}

/// Every problem found in one pass over a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<SpecError>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), Vec<SpecError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Checks a form for the mistakes the engine would otherwise silently tolerate.
pub fn lint(spec: &FormSpec) -> LintReport {
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    for question in &spec.questions {
        if !seen.insert(question.id.as_str()) && reported.insert(question.id.as_str()) {
            errors.push(SpecError::DuplicateId(question.id.clone()));
        }
    }

    for question in &spec.questions {
        for condition in &question.skip_if {
            for field in condition.fields() {
                if !seen.contains(field) {
                    errors.push(SpecError::UnknownReference {
                        question_id: question.id.clone(),
                        field: field.to_string(),
                    });
                }
            }
        }

        let Some(rule) = &question.validation else {
            continue;
        };
        let mut min_len = None;
        let mut max_len = None;
        for nested in rule.walk() {
            match nested {
                ValidationRule::Pattern { pattern, .. } => {
                    if let Err(err) = Regex::new(pattern) {
                        errors.push(SpecError::InvalidPattern {
                            question_id: question.id.clone(),
                            pattern: pattern.clone(),
                            reason: err.to_string(),
                        });
                    }
                }
                ValidationRule::MinLength { min, .. } => min_len = Some(*min),
                ValidationRule::MaxLength { max, .. } => max_len = Some(*max),
                _ => {}
            }
        }
        if let (Some(min), Some(max)) = (min_len, max_len)
            && min > max
        {
            errors.push(SpecError::InvalidLengthBounds {
                question_id: question.id.clone(),
                min,
                max,
            });
        }
    }

    LintReport { errors }
}
