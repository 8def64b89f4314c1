use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answers::{Answers, as_number, is_blank};

/// Numeric comparison used by [`Expr::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
        }
    }
}

/// Lightweight predicate AST evaluated against the answer map, used for `skip_if`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    LiteralBool { value: bool },
    /// The answer equals `value`.
    Eq { field: String, value: Value },
    /// The answer is missing, null, or an empty string.
    Empty { field: String },
    Compare {
        field: String,
        cmp: Comparison,
        value: f64,
    },
    And { expressions: Vec<Expr> },
    Or { expressions: Vec<Expr> },
    Not { expression: Box<Expr> },
    /// The answer is the boolean `true`.
    Var { field: String },
}

impl Expr {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::negate(Expr::equals(field, value))
    }

    pub fn empty(field: impl Into<String>) -> Self {
        Expr::Empty {
            field: field.into(),
        }
    }

    pub fn compare(field: impl Into<String>, cmp: Comparison, value: f64) -> Self {
        Expr::Compare {
            field: field.into(),
            cmp,
            value,
        }
    }

    pub fn negate(expression: Expr) -> Self {
        Expr::Not {
            expression: Box::new(expression),
        }
    }

    /// Evaluates the expression to a boolean if possible.
    ///
    /// Returns `None` when a referenced answer cannot be interpreted, e.g. a
    /// non-numeric value in a numeric comparison. `and`/`or` only resolve past an
    /// unknown operand when another operand already decides the result.
    pub fn evaluate(&self, answers: &Answers) -> Option<bool> {
        match self {
            Expr::LiteralBool { value } => Some(*value),
            Expr::Eq { field, value } => {
                let answer = answers.get(field)?;
                Some(loosely_equal(answer, value))
            }
            Expr::Empty { field } => Some(is_blank(answers.get(field))),
            Expr::Compare { field, cmp, value } => {
                let answer = as_number(answers.get(field))?;
                Some(cmp.holds(answer, *value))
            }
            Expr::And { expressions } => {
                let mut unresolved = false;
                for expr in expressions {
                    match expr.evaluate(answers) {
                        Some(true) => {}
                        Some(false) => return Some(false),
                        None => unresolved = true,
                    }
                }
                (!unresolved).then_some(true)
            }
            Expr::Or { expressions } => {
                let mut unresolved = false;
                for expr in expressions {
                    match expr.evaluate(answers) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => unresolved = true,
                    }
                }
                (!unresolved).then_some(false)
            }
            Expr::Not { expression } => expression.evaluate(answers).map(|value| !value),
            Expr::Var { field } => answers.get(field).and_then(Value::as_bool),
        }
    }

    /// Convenience for skip conditions: anything unresolvable does not hold.
    pub fn holds(&self, answers: &Answers) -> bool {
        self.evaluate(answers).unwrap_or(false)
    }

    /// Every answer id the expression reads.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::LiteralBool { .. } => {}
            Expr::Eq { field, .. }
            | Expr::Empty { field }
            | Expr::Compare { field, .. }
            | Expr::Var { field } => out.push(field),
            Expr::And { expressions } | Expr::Or { expressions } => {
                for expr in expressions {
                    expr.collect_fields(out);
                }
            }
            Expr::Not { expression } => expression.collect_fields(out),
        }
    }
}

// Text inputs report numbers as strings, so "25" and 25 compare equal.
fn loosely_equal(answer: &Value, expected: &Value) -> bool {
    match (answer, expected) {
        (Value::String(text), Value::Number(number))
        | (Value::Number(number), Value::String(text)) => match text.trim().parse::<f64>() {
            Ok(parsed) => number.as_f64() == Some(parsed),
            Err(_) => false,
        },
        _ => answer == expected,
    }
}
