use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answers::{Answers, as_number, is_blank};

const REQUIRED: &str = "This field is required";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Signature for validators supplied from code rather than a form file.
pub type ValidatorFn = fn(value: Option<&Value>, answers: &Answers, field_id: &str) -> Option<String>;

/// Function-pointer validator. Compared by address.
#[derive(Clone, Copy)]
pub struct CustomRule(pub ValidatorFn);

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule(..)")
    }
}

impl PartialEq for CustomRule {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.0, other.0)
    }
}

/// Per-question validation rule.
///
/// Declarative rules round-trip through JSON; [`ValidationRule::Custom`] exists
/// only in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    Required {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MinLength {
        min: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    RequiredNumber {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Email {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Pattern {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Runs each rule in order and reports the first failure.
    All { rules: Vec<ValidationRule> },
    #[serde(skip)]
    Custom(CustomRule),
}

impl ValidationRule {
    pub fn required() -> Self {
        ValidationRule::Required { message: None }
    }

    pub fn min_length(min: usize) -> Self {
        ValidationRule::MinLength { min, message: None }
    }

    pub fn max_length(max: usize) -> Self {
        ValidationRule::MaxLength { max, message: None }
    }

    pub fn required_number() -> Self {
        ValidationRule::RequiredNumber { message: None }
    }

    pub fn email() -> Self {
        ValidationRule::Email { message: None }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        ValidationRule::Pattern {
            pattern: pattern.into(),
            message: None,
        }
    }

    pub fn custom(validator: ValidatorFn) -> Self {
        ValidationRule::Custom(CustomRule(validator))
    }

    /// Replaces the default message. No-op for `All` and `Custom`.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            ValidationRule::Required { message }
            | ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::RequiredNumber { message }
            | ValidationRule::Email { message }
            | ValidationRule::Pattern { message, .. } => *message = Some(text.into()),
            ValidationRule::All { .. } | ValidationRule::Custom(_) => {}
        }
        self
    }

    /// Returns the error message for `value`, or `None` when it passes.
    pub fn check(&self, value: Option<&Value>, answers: &Answers, field_id: &str) -> Option<String> {
        match self {
            ValidationRule::Required { message } => {
                is_blank(value).then(|| or_default(message, REQUIRED))
            }
            ValidationRule::MinLength { min, message } => {
                let len = char_len(value)?;
                (len < *min).then(|| {
                    message
                        .clone()
                        .unwrap_or_else(|| format!("Must be at least {min} characters"))
                })
            }
            ValidationRule::MaxLength { max, message } => {
                let len = char_len(value)?;
                (len > *max).then(|| {
                    message
                        .clone()
                        .unwrap_or_else(|| format!("Must be at most {max} characters"))
                })
            }
            ValidationRule::RequiredNumber { message } => {
                if is_blank(value) {
                    return Some(REQUIRED.to_string());
                }
                as_number(value)
                    .is_none()
                    .then(|| or_default(message, "Must be a number"))
            }
            ValidationRule::Email { message } => {
                if is_blank(value) {
                    return Some(REQUIRED.to_string());
                }
                let matches = value
                    .and_then(Value::as_str)
                    .is_some_and(|text| EMAIL.is_match(text));
                (!matches).then(|| or_default(message, "Must be a valid email"))
            }
            ValidationRule::Pattern { pattern, message } => {
                let text = value.and_then(Value::as_str)?;
                let regex = Regex::new(pattern).ok()?;
                (!regex.is_match(text))
                    .then(|| or_default(message, "Value does not match the expected format"))
            }
            ValidationRule::All { rules } => rules
                .iter()
                .find_map(|rule| rule.check(value, answers, field_id)),
            ValidationRule::Custom(CustomRule(validator)) => validator(value, answers, field_id),
        }
    }

    /// Yields this rule and every nested rule.
    pub fn walk(&self) -> Vec<&ValidationRule> {
        let mut out = vec![self];
        if let ValidationRule::All { rules } = self {
            for rule in rules {
                out.extend(rule.walk());
            }
        }
        out
    }
}

fn or_default(message: &Option<String>, fallback: &str) -> String {
    message.clone().unwrap_or_else(|| fallback.to_string())
}

fn char_len(value: Option<&Value>) -> Option<usize> {
    value.and_then(Value::as_str).map(|text| text.chars().count())
}
