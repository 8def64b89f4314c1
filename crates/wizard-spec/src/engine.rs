use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::answers::{Answers, ValidationError};
use crate::initial::build_initial_values;
use crate::render::{RenderPayload, build_render_payload};
use crate::spec::form::{CursorPolicy, FormSpec};
use crate::spec::question::Question;
use crate::validate::{ValidationRules, build_validation_rules};
use crate::visibility::is_skipped;

/// Receives the final answer map when the last step validates.
pub trait SubmitHandler {
    fn submit(&mut self, answers: &Answers);
}

impl<F> SubmitHandler for F
where
    F: FnMut(&Answers),
{
    fn submit(&mut self, answers: &Answers) {
        self(answers)
    }
}

/// Result of [`Wizard::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The effective sequence is empty.
    NoQuestion,
    /// The current answer failed validation; nothing moved.
    Blocked(ValidationError),
    /// The cursor moved to the next question.
    Advanced { from: String, to: String },
    /// The last question validated and the answers were handed off.
    Submitted(Answers),
}

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Active { cursor: usize },
    Empty,
    Submitted,
}

/// Step-by-step controller over a [`FormSpec`].
///
/// The effective sequence is never stored: every read filters the question
/// list against the current answers and resolves the cursor into it.
pub struct Wizard {
    spec: FormSpec,
    rules: ValidationRules,
    answers: Answers,
    cursor: usize,
    anchor: Option<String>,
    errors: BTreeMap<String, String>,
    submitted: bool,
    submissions: usize,
    on_submit: Option<Box<dyn SubmitHandler>>,
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("form", &self.spec.id)
            .field("answers", &self.answers)
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("errors", &self.errors)
            .field("submissions", &self.submissions)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    pub fn new(spec: FormSpec) -> Self {
        let rules = build_validation_rules(&spec.questions);
        let answers = build_initial_values(&spec.questions);
        let mut wizard = Self {
            spec,
            rules,
            answers,
            cursor: 0,
            anchor: None,
            errors: BTreeMap::new(),
            submitted: false,
            submissions: 0,
            on_submit: None,
        };
        wizard.restart();
        wizard
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self::new(FormSpec::new("wizard", "Wizard", questions))
    }

    /// Registers the callback that receives the final answers.
    pub fn on_submit(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.on_submit = Some(Box::new(handler));
        self
    }

    /// Overlays previously collected answers and starts from the first step.
    pub fn with_answers(mut self, answers: &Answers) -> Self {
        self.answers.merge(answers);
        self.restart();
        self
    }

    fn restart(&mut self) {
        self.cursor = 0;
        self.anchor = self
            .effective_indices()
            .first()
            .map(|&index| self.spec.questions[index].id.clone());
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.answers.get(id)
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn submission_count(&self) -> usize {
        self.submissions
    }

    /// Overwrites one answer. Never validates.
    pub fn set_answer(&mut self, id: &str, value: impl Into<Value>) {
        self.answers.set(id, value);
        self.errors.remove(id);
        self.submitted = false;
        debug!(form = %self.spec.id, question = %id, "answer updated");
    }

    /// Questions not currently skipped, in original order.
    pub fn effective_sequence(&self) -> Vec<&Question> {
        self.effective_indices()
            .into_iter()
            .map(|index| &self.spec.questions[index])
            .collect()
    }

    fn effective_indices(&self) -> Vec<usize> {
        self.spec
            .questions
            .iter()
            .enumerate()
            .filter(|(_, question)| !is_skipped(question, &self.answers))
            .map(|(index, _)| index)
            .collect()
    }

    fn resolve(&self, sequence: &[usize]) -> Option<usize> {
        let last = sequence.len().checked_sub(1)?;
        let clamped = self.cursor.min(last);
        match self.spec.cursor_policy() {
            CursorPolicy::Index => Some(clamped),
            CursorPolicy::Identity => {
                let Some(anchor) = self.anchor.as_deref() else {
                    return Some(clamped);
                };
                let questions = &self.spec.questions;
                if let Some(position) = sequence
                    .iter()
                    .position(|&index| questions[index].id == anchor)
                {
                    return Some(position);
                }
                let Some(origin) = questions.iter().position(|question| question.id == anchor)
                else {
                    return Some(clamped);
                };
                Some(
                    sequence
                        .iter()
                        .position(|&index| index > origin)
                        .unwrap_or(last),
                )
            }
        }
    }

    /// Cursor position within the effective sequence, if any question is displayable.
    pub fn position(&self) -> Option<usize> {
        self.resolve(&self.effective_indices())
    }

    pub fn total(&self) -> usize {
        self.effective_indices().len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        let sequence = self.effective_indices();
        let position = self.resolve(&sequence)?;
        Some(&self.spec.questions[sequence[position]])
    }

    pub fn current_value(&self) -> Option<&Value> {
        let question = self.current_question()?;
        self.answers.get(&question.id)
    }

    pub fn current_error(&self) -> Option<&str> {
        let question = self.current_question()?;
        self.error(&question.id)
    }

    pub fn can_go_back(&self) -> bool {
        self.position().is_some_and(|position| position > 0)
    }

    pub fn is_last(&self) -> bool {
        let sequence = self.effective_indices();
        self.resolve(&sequence)
            .is_some_and(|position| position + 1 == sequence.len())
    }

    pub fn state(&self) -> WizardState {
        match self.position() {
            None => WizardState::Empty,
            Some(_) if self.submitted => WizardState::Submitted,
            Some(cursor) => WizardState::Active { cursor },
        }
    }

    fn move_to(&mut self, position: usize, sequence: &[usize]) {
        self.cursor = position;
        self.anchor = Some(self.spec.questions[sequence[position]].id.clone());
    }

    /// Steps back one question. Returns false when already at the start.
    pub fn go_back(&mut self) -> bool {
        let sequence = self.effective_indices();
        let Some(position) = self.resolve(&sequence) else {
            return false;
        };
        if position == 0 {
            return false;
        }
        self.move_to(position - 1, &sequence);
        self.submitted = false;
        debug!(form = %self.spec.id, cursor = self.cursor, "went back");
        true
    }

    /// Validates the current question, then moves forward or submits.
    pub fn advance(&mut self) -> Advance {
        let sequence = self.effective_indices();
        let Some(position) = self.resolve(&sequence) else {
            debug!(form = %self.spec.id, "no question available");
            return Advance::NoQuestion;
        };
        let id = self.spec.questions[sequence[position]].id.clone();
        self.move_to(position, &sequence);

        if let Some(error) = self.rules.check(&id, &self.answers) {
            debug!(form = %self.spec.id, question = %id, reason = %error.message, "advance blocked");
            self.errors.insert(id, error.message.clone());
            return Advance::Blocked(error);
        }
        self.errors.remove(&id);

        if position + 1 < sequence.len() {
            self.move_to(position + 1, &sequence);
            let to = self.spec.questions[sequence[position + 1]].id.clone();
            debug!(form = %self.spec.id, from = %id, to = %to, "advanced");
            return Advance::Advanced { from: id, to };
        }

        self.submitted = true;
        self.submissions += 1;
        info!(form = %self.spec.id, submissions = self.submissions, "wizard submitted");
        if let Some(handler) = self.on_submit.as_mut() {
            handler.submit(&self.answers);
        }
        Advance::Submitted(self.answers.clone())
    }

    /// Snapshot of everything a presenter needs to draw the current step.
    pub fn view(&self) -> RenderPayload {
        build_render_payload(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::rules::ValidationRule;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn three_step() -> Vec<Question> {
        vec![
            Question::new("a", "A").with_validation(ValidationRule::required()),
            Question::new("b", "B").skip_if(Expr::equals("a", "skip")),
            Question::new("c", "C"),
        ]
    }

    #[test]
    fn starts_on_first_effective_question() {
        let wizard = Wizard::from_questions(three_step());
        assert_eq!(wizard.current_question().map(|q| q.id.as_str()), Some("a"));
        assert_eq!(wizard.state(), WizardState::Active { cursor: 0 });
        assert!(!wizard.can_go_back());
        assert!(!wizard.is_last());
    }

    #[test]
    fn blocked_advance_records_error_until_edit() {
        let mut wizard = Wizard::from_questions(three_step());
        assert!(matches!(wizard.advance(), Advance::Blocked(_)));
        assert_eq!(wizard.error("a"), Some("This field is required"));
        assert_eq!(wizard.current_error(), Some("This field is required"));
        wizard.set_answer("a", "x");
        assert_eq!(wizard.error("a"), None);
    }

    #[test]
    fn submit_handler_runs_once_per_submission() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut wizard = Wizard::from_questions(vec![Question::new("only", "Only")])
            .on_submit(move |answers: &Answers| sink.borrow_mut().push(answers.clone()));

        assert!(wizard.is_last());
        assert!(matches!(wizard.advance(), Advance::Submitted(_)));
        assert_eq!(wizard.state(), WizardState::Submitted);
        assert!(matches!(wizard.advance(), Advance::Submitted(_)));
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(wizard.submission_count(), 2);

        wizard.set_answer("only", "changed");
        assert_eq!(wizard.state(), WizardState::Active { cursor: 0 });
    }

    #[test]
    fn with_answers_overlays_initial_values() {
        let seed: Answers = [("a", "skip")].into_iter().collect();
        let wizard = Wizard::from_questions(three_step()).with_answers(&seed);
        let ids: Vec<_> = wizard
            .effective_sequence()
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(wizard.value("b"), Some(&Value::String(String::new())));
    }
}
