use serde_json::{Map, Value, json};

use crate::engine::{Wizard, WizardState};
use crate::spec::question::QuestionType;
use crate::visibility::resolve_visibility;

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// A question is waiting for input.
    NeedInput,
    /// The last step validated and the answers were submitted.
    Submitted,
    /// Every question is currently skipped.
    Empty,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Submitted => "submitted",
            RenderStatus::Empty => "empty",
        }
    }
}

/// Where the cursor sits inside the effective sequence (1-based position).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub position: usize,
    pub total: usize,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderQuestion {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: QuestionType,
    pub visible: bool,
    pub current_value: Option<Value>,
    pub error: Option<String>,
}

/// Everything a presenter needs to draw the current step.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub help: Option<String>,
    pub status: RenderStatus,
    pub current: Option<RenderQuestion>,
    pub progress: RenderProgress,
    pub can_go_back: bool,
    pub is_last: bool,
    pub questions: Vec<RenderQuestion>,
}

impl RenderPayload {
    pub fn current_question_id(&self) -> Option<&str> {
        self.current.as_ref().map(|question| question.id.as_str())
    }
}

pub fn build_render_payload(wizard: &Wizard) -> RenderPayload {
    let spec = wizard.spec();
    let answers = wizard.answers();
    let visibility = resolve_visibility(&spec.questions, answers);

    let questions = spec
        .questions
        .iter()
        .map(|question| RenderQuestion {
            id: question.id.clone(),
            title: question.title.clone(),
            description: question.description.clone(),
            kind: question.kind,
            visible: visibility.get(&question.id).copied().unwrap_or(true),
            current_value: answers.get(&question.id).cloned(),
            error: wizard.error(&question.id).map(String::from),
        })
        .collect::<Vec<_>>();

    let current = wizard.current_question().and_then(|current| {
        questions
            .iter()
            .find(|question| question.id == current.id)
            .cloned()
    });

    let status = match wizard.state() {
        WizardState::Active { .. } => RenderStatus::NeedInput,
        WizardState::Submitted => RenderStatus::Submitted,
        WizardState::Empty => RenderStatus::Empty,
    };

    RenderPayload {
        form_id: spec.id.clone(),
        form_title: spec.title.clone(),
        help: spec.description.clone(),
        status,
        current,
        progress: RenderProgress {
            position: wizard.position().map_or(0, |position| position + 1),
            total: wizard.total(),
        },
        can_go_back: wizard.can_go_back(),
        is_last: wizard.is_last(),
        questions,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(question_json)
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "status": payload.status.as_str(),
        "current_question_id": payload.current_question_id(),
        "current": payload.current.as_ref().map(question_json),
        "progress": {
            "position": payload.progress.position,
            "total": payload.progress.total,
        },
        "can_go_back": payload.can_go_back,
        "is_last": payload.is_last,
        "help": payload.help,
        "questions": questions,
    })
}

fn question_json(question: &RenderQuestion) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(question.id.clone()));
    map.insert("title".into(), Value::String(question.title.clone()));
    map.insert(
        "description".into(),
        question
            .description
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    map.insert("type".into(), Value::String(question.kind.as_str().to_string()));
    if let Some(current_value) = &question.current_value {
        map.insert("current_value".into(), current_value.clone());
    }
    if let Some(error) = &question.error {
        map.insert("error".into(), Value::String(error.clone()));
    }
    map.insert("visible".into(), Value::Bool(question.visible));
    Value::Object(map)
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.position,
        payload.progress.total
    ));
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }

    match &payload.current {
        Some(question) => {
            lines.push(format!("Current question: {}", question.id));
            lines.push(format!("  Title: {}", question.title));
            if let Some(description) = &question.description {
                lines.push(format!("  Description: {}", description));
            }
            if let Some(value) = &question.current_value
                && !value_to_display(value).is_empty()
            {
                lines.push(format!("  Current value: {}", value_to_display(value)));
            }
            if let Some(error) = &question.error {
                lines.push(format!("  Error: {}", error));
            }
            let mut actions = Vec::new();
            if payload.can_go_back {
                actions.push("previous");
            }
            actions.push(if payload.is_last { "submit" } else { "next" });
            lines.push(format!("  Actions: {}", actions.join(", ")));
        }
        None => lines.push("No questions available.".to_string()),
    }

    lines.push("Visible questions:".to_string());
    for question in payload.questions.iter().filter(|question| question.visible) {
        let mut entry = format!(" - {} ({})", question.id, question.title);
        if let Some(current_value) = &question.current_value {
            let shown = value_to_display(current_value);
            if !shown.is_empty() {
                entry.push_str(&format!(" = {}", shown));
            }
        }
        lines.push(entry);
    }

    lines.join("\n")
}

pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
