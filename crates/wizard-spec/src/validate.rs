use std::collections::BTreeMap;

use crate::answers::{Answers, ValidationError};
use crate::expr::Expr;
use crate::rules::ValidationRule;
use crate::spec::question::Question;

/// Skip-aware validator for a single question.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    id: String,
    skip_if: Vec<Expr>,
    rule: Option<ValidationRule>,
}

impl FieldValidator {
    fn from_question(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            skip_if: question.skip_if.clone(),
            rule: question.validation.clone(),
        }
    }

    /// A skipped question never blocks; otherwise the question's own rule decides.
    pub fn check(&self, value: Option<&serde_json::Value>, answers: &Answers) -> Option<String> {
        if self.skip_if.iter().any(|condition| condition.holds(answers)) {
            return None;
        }
        self.rule
            .as_ref()
            .and_then(|rule| rule.check(value, answers, &self.id))
    }
}

/// Question id to composed validator.
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    validators: BTreeMap<String, FieldValidator>,
}

impl ValidationRules {
    pub fn get(&self, id: &str) -> Option<&FieldValidator> {
        self.validators.get(id)
    }

    /// Validates the stored answer of `id`. Unknown ids never fail.
    pub fn check(&self, id: &str, answers: &Answers) -> Option<ValidationError> {
        let validator = self.validators.get(id)?;
        validator
            .check(answers.get(id), answers)
            .map(|message| ValidationError {
                question_id: id.to_string(),
                message,
            })
    }
}

/// Derives one skip-aware validator per question id. Later duplicates win.
pub fn build_validation_rules(questions: &[Question]) -> ValidationRules {
    let validators = questions
        .iter()
        .map(|question| (question.id.clone(), FieldValidator::from_question(question)))
        .collect();
    ValidationRules { validators }
}

/// Runs every validator against `answers`, in question order, one error per id.
///
/// Skipped questions pass. Used to audit a prefilled answer map.
pub fn validate_all(questions: &[Question], answers: &Answers) -> Vec<ValidationError> {
    let rules = build_validation_rules(questions);
    let mut errors = Vec::new();
    for question in questions {
        if let Some(error) = rules.check(&question.id, answers)
            && !errors
                .iter()
                .any(|existing: &ValidationError| existing.question_id == error.question_id)
        {
            errors.push(error);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initial::build_initial_values;
    use serde_json::json;

    fn company_questions() -> Vec<Question> {
        vec![
            Question::new("has_company", "Do you have a company?")
                .with_validation(ValidationRule::required()),
            Question::new("company_name", "Company name")
                .with_validation(ValidationRule::required())
                .skip_if(Expr::not_equals("has_company", "yes")),
        ]
    }

    #[test]
    fn skipped_question_never_blocks() {
        let questions = company_questions();
        let rules = build_validation_rules(&questions);
        let mut answers = build_initial_values(&questions);
        answers.set("has_company", "no");
        assert_eq!(rules.check("company_name", &answers), None);
    }

    #[test]
    fn visible_question_delegates_to_rule() {
        let questions = company_questions();
        let rules = build_validation_rules(&questions);
        let mut answers = build_initial_values(&questions);
        answers.set("has_company", "yes");
        let error = rules.check("company_name", &answers).expect("error");
        assert_eq!(error.question_id, "company_name");
        assert_eq!(error.message, "This field is required");
    }

    #[test]
    fn missing_rule_always_passes() {
        let questions = vec![Question::new("email", "Email")];
        let rules = build_validation_rules(&questions);
        assert_eq!(rules.check("email", &Answers::new()), None);
        assert_eq!(rules.check("unknown", &Answers::new()), None);
    }

    #[test]
    fn field_validator_uses_supplied_value() {
        let questions = vec![Question::new("name", "Name").with_validation(ValidationRule::required())];
        let rules = build_validation_rules(&questions);
        let validator = rules.get("name").expect("validator");
        assert!(validator.check(Some(&json!("")), &Answers::new()).is_some());
        assert!(validator.check(Some(&json!("Ada")), &Answers::new()).is_none());
    }

    #[test]
    fn validate_all_reports_visible_failures_in_order() {
        let mut questions = company_questions();
        questions.push(Question::new("email", "Email").with_validation(ValidationRule::email()));
        let mut answers = build_initial_values(&questions);
        answers.set("has_company", "yes");
        answers.set("email", "nope");
        let errors = validate_all(&questions, &answers);
        let ids: Vec<_> = errors.iter().map(|error| error.question_id.as_str()).collect();
        assert_eq!(ids, vec!["company_name", "email"]);
    }
}
