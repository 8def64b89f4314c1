pub mod form;
pub mod question;

pub use form::{CursorPolicy, FormSpec, NavigationPolicy};
pub use question::{Question, QuestionType};
