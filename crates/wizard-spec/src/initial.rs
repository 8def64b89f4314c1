use serde_json::Value;

use crate::answers::{Answers, is_blank};
use crate::spec::question::Question;

/// Seeds the answer map: one entry per question id, skipped or not.
///
/// Blank or missing initial values become `""`. Later duplicates of an id win.
pub fn build_initial_values(questions: &[Question]) -> Answers {
    let mut answers = Answers::new();
    for question in questions {
        let value = match &question.initial_value {
            Some(value) if !is_blank(Some(value)) => value.clone(),
            _ => Value::String(String::new()),
        };
        answers.set(question.id.clone(), value);
    }
    answers
}
