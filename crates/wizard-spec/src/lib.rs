#![allow(missing_docs)]

pub mod answers;
pub mod engine;
pub mod expr;
pub mod initial;
pub mod lint;
pub mod render;
pub mod rules;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{Answers, AnswersError, ValidationError};
pub use engine::{Advance, SubmitHandler, Wizard, WizardState};
pub use expr::{Comparison, Expr};
pub use initial::build_initial_values;
pub use lint::{LintReport, SpecError, lint};
pub use render::{
    RenderPayload, RenderProgress, RenderQuestion, RenderStatus, build_render_payload,
    render_json_ui, render_text,
};
pub use rules::{CustomRule, ValidationRule, ValidatorFn};
pub use spec::{CursorPolicy, FormSpec, NavigationPolicy, Question, QuestionType};
pub use validate::{FieldValidator, ValidationRules, build_validation_rules, validate_all};
pub use visibility::{VisibilityMap, effective_sequence, is_skipped, resolve_visibility};
