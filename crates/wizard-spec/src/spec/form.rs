use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::Question;

/// How the cursor is re-resolved when the effective sequence changes under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CursorPolicy {
    /// Follow the displayed question by id, snapping forward when it gets skipped.
    #[default]
    Identity,
    /// Keep a bare index and clamp it into the sequence bounds.
    Index,
}

/// Navigation policies shared by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct NavigationPolicy {
    #[serde(default)]
    pub cursor: CursorPolicy,
}

/// Top-level wizard definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationPolicy>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl FormSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            navigation: None,
            questions,
        }
    }

    pub fn with_cursor_policy(mut self, cursor: CursorPolicy) -> Self {
        self.navigation = Some(NavigationPolicy { cursor });
        self
    }

    pub fn cursor_policy(&self) -> CursorPolicy {
        self.navigation.map(|policy| policy.cursor).unwrap_or_default()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().rev().find(|question| question.id == id)
    }
}
