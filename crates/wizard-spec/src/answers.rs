use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure while encoding an answer map.
#[derive(Debug, Error)]
pub enum AnswersError {
    #[error("cbor encode error: {0}")]
    Cbor(#[from] serde_cbor::Error),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("answers must be a JSON object")]
    NotAnObject,
}

/// Current value per question id.
///
/// Entries are overwritten, never removed, for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    values: Map<String, Value>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, AnswersError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(AnswersError::NotAnObject),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Copies every entry of `other` over this map.
    pub fn merge(&mut self, other: &Answers) {
        for (id, value) in other.iter() {
            self.values.insert(id.clone(), value.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn to_json_pretty(&self) -> Result<String, AnswersError> {
        Ok(serde_json::to_string_pretty(&self.values)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, AnswersError> {
        Ok(serde_cbor::to_vec(&self.values)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, AnswersError> {
        let values: Map<String, Value> = serde_cbor::from_slice(bytes)?;
        Ok(Self { values })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Answers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(id, value)| (id.into(), value.into()))
            .collect();
        Self { values }
    }
}

/// A blocked step: the message the presenter shows next to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub question_id: String,
    pub message: String,
}

/// Missing, `null`, and `""` all count as no answer. `0` and `false` are answers.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Reads a value as a number the way a numeric input would: JSON numbers as-is,
/// strings after trimming, and an empty string as zero.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
            }
        }
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cbor_preserves_entries() {
        let answers: Answers = [("name", json!("John")), ("age", json!(25))]
            .into_iter()
            .collect();
        let bytes = answers.to_cbor().expect("cbor");
        let decoded = Answers::from_cbor(&bytes).expect("decode");
        assert_eq!(decoded, answers);
    }

    #[test]
    fn from_value_rejects_arrays() {
        assert!(matches!(
            Answers::from_value(json!(["a"])),
            Err(AnswersError::NotAnObject)
        ));
    }

    #[test]
    fn blank_covers_missing_null_and_empty() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&Value::Null)));
        assert!(is_blank(Some(&json!(""))));
        assert!(!is_blank(Some(&json!(" "))));
        assert!(!is_blank(Some(&json!(0))));
    }

    #[test]
    fn numbers_parse_like_numeric_inputs() {
        assert_eq!(as_number(Some(&json!(" 25 "))), Some(25.0));
        assert_eq!(as_number(Some(&json!(""))), Some(0.0));
        assert_eq!(as_number(Some(&json!(18))), Some(18.0));
        assert_eq!(as_number(Some(&json!("abc"))), None);
        assert_eq!(as_number(Some(&json!("inf"))), None);
        assert_eq!(as_number(None), None);
    }
}
