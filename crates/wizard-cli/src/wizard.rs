use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use wizard_spec::{
    Advance, Answers, QuestionType, RenderPayload, ValidationError, Wizard, render::value_to_display,
    render_text,
};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: full step summary before every prompt.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// One line of user input, interpreted.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Back,
    Quit,
    Clear,
    /// Empty line: advance with whatever is stored.
    Keep,
    Answer(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":back" | ":b" => Input::Back,
            ":quit" | ":q" => Input::Quit,
            ":clear" => Input::Clear,
            "" => Input::Keep,
            text => Input::Answer(text.to_string()),
        }
    }
}

/// How an interactive session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    Submitted(Answers),
    Empty,
    Aborted,
}

/// Prints prompts, inline errors and the final answers for the text shell.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_cbor: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_cbor: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_cbor,
        }
    }

    pub fn show_header(&mut self, out: &mut impl Write, payload: &RenderPayload) -> io::Result<()> {
        if self.header_printed {
            return Ok(());
        }
        writeln!(out, "Form: {}", payload.form_title)?;
        if let Some(help) = &payload.help {
            writeln!(out, "{}", help)?;
        }
        writeln!(
            out,
            "Press enter to keep the current value, :back to go back, :quit to stop."
        )?;
        self.header_printed = true;
        Ok(())
    }

    pub fn show_prompt(&self, out: &mut impl Write, payload: &RenderPayload) -> io::Result<()> {
        if self.verbosity.is_verbose() {
            writeln!(out, "{}", render_text(payload))?;
        }
        let Some(question) = &payload.current else {
            return Ok(());
        };
        let mut line = format!(
            "{}/{} {}",
            payload.progress.position, payload.progress.total, question.title
        );
        if let Some(hint) = kind_hint(question.kind) {
            line.push(' ');
            line.push_str(hint);
        }
        if let Some(value) = &question.current_value {
            let shown = value_to_display(value);
            if !shown.is_empty() {
                line.push_str(&format!(" [{}]", shown));
            }
        }
        writeln!(out, "{}", line)?;
        if let Some(description) = &question.description {
            writeln!(out, "{}", description)?;
        }
        Ok(())
    }

    pub fn show_error(&self, error: &ValidationError) {
        eprintln!("Invalid answer: {}", error.message);
        if self.verbosity.is_verbose() {
            eprintln!("  Question: {}", error.question_id);
        }
    }

    pub fn show_completion(&self, out: &mut impl Write, answers: &Answers) -> io::Result<()> {
        writeln!(out, "Done ✅")?;
        if self.show_cbor {
            match answers.to_cbor() {
                Ok(bytes) => writeln!(out, "Answers (CBOR hex): {}", encode_hex(&bytes))?,
                Err(err) => eprintln!("Failed to serialize answers to CBOR: {}", err),
            }
        }
        match answers.to_json_pretty() {
            Ok(pretty) => writeln!(out, "{}", pretty)?,
            Err(err) => eprintln!("Failed to serialize answers to JSON: {}", err),
        }
        Ok(())
    }
}

/// Drives `wizard` from line-oriented input until it submits or input ends.
pub fn run_session(
    wizard: &mut Wizard,
    presenter: &mut WizardPresenter,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<SessionOutcome> {
    let mut lines = input.lines();
    loop {
        let payload = wizard.view();
        presenter.show_header(out, &payload)?;
        let Some(question_id) = payload.current_question_id().map(String::from) else {
            writeln!(out, "No questions available.")?;
            return Ok(SessionOutcome::Empty);
        };
        presenter.show_prompt(out, &payload)?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(SessionOutcome::Aborted);
        };
        match Input::parse(&line) {
            Input::Quit => return Ok(SessionOutcome::Aborted),
            Input::Back => {
                if !wizard.go_back() {
                    writeln!(out, "Already at the first question.")?;
                }
                continue;
            }
            Input::Clear => wizard.set_answer(&question_id, ""),
            Input::Keep => {}
            Input::Answer(text) => wizard.set_answer(&question_id, text),
        }

        match wizard.advance() {
            Advance::Blocked(error) => presenter.show_error(&error),
            Advance::Submitted(answers) => {
                presenter.show_completion(out, &answers)?;
                return Ok(SessionOutcome::Submitted(answers));
            }
            Advance::Advanced { .. } | Advance::NoQuestion => {}
        }
    }
}

fn kind_hint(kind: QuestionType) -> Option<&'static str> {
    match kind {
        QuestionType::Number => Some("(number)"),
        QuestionType::Email => Some("(email)"),
        QuestionType::Text => None,
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_spec::{Question, ValidationRule};

    fn session(questions: Vec<Question>, script: &str) -> (SessionOutcome, String) {
        let mut wizard = Wizard::from_questions(questions);
        let mut presenter = WizardPresenter::new(Verbosity::Clean, false);
        let mut out = Vec::new();
        let outcome = run_session(&mut wizard, &mut presenter, script.as_bytes(), &mut out)
            .expect("session");
        (outcome, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse(":back\n"), Input::Back);
        assert_eq!(Input::parse(" :q "), Input::Quit);
        assert_eq!(Input::parse(""), Input::Keep);
        assert_eq!(Input::parse(" Ada "), Input::Answer("Ada".into()));
    }

    #[test]
    fn blank_line_keeps_stored_value() {
        let questions = vec![
            Question::new("city", "City").with_initial_value("Oslo"),
            Question::new("zip", "Zip"),
        ];
        let (outcome, output) = session(questions, "\n0150\n");
        let SessionOutcome::Submitted(answers) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(answers.get("city").and_then(|v| v.as_str()), Some("Oslo"));
        assert!(output.contains("1/2 City [Oslo]"));
    }

    #[test]
    fn back_returns_to_previous_prompt() {
        let questions = vec![Question::new("a", "First"), Question::new("b", "Second")];
        let (outcome, output) = session(questions, "x\n:back\n\ny\n");
        assert!(matches!(outcome, SessionOutcome::Submitted(_)));
        assert_eq!(output.matches("1/2 First").count(), 2);
    }

    #[test]
    fn input_ending_early_aborts() {
        let questions =
            vec![Question::new("name", "Name").with_validation(ValidationRule::required())];
        let (outcome, _) = session(questions, "\n");
        assert!(matches!(outcome, SessionOutcome::Aborted));
    }

    #[test]
    fn empty_form_ends_immediately() {
        let (outcome, output) = session(Vec::new(), "");
        assert!(matches!(outcome, SessionOutcome::Empty));
        assert!(output.contains("No questions available."));
    }

    #[test]
    fn hex_encoding_is_lowercase() {
        assert_eq!(encode_hex(&[0x0a, 0xff]), "0aff");
    }
}
