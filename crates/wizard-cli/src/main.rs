mod wizard;

use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wizard::{SessionOutcome, Verbosity, WizardPresenter, run_session};
use wizard_spec::{Answers, FormSpec, Wizard, build_initial_values, lint, validate_all};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const DEFAULT_SPEC: &str = include_str!("../../wizard-spec/tests/fixtures/profile_form.json");
const DEFAULT_LOG_FILTER: &str = "wizard_flow=warn,wizard_spec=warn";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Step-by-step form wizard in a text shell",
    long_about = "Walks through a form one question at a time, skipping questions that do not apply and validating each answer before moving on"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a wizard interactively over stdin/stdout.
    Run {
        /// Path to the form definition JSON (defaults to the built-in profile form).
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
        /// Optional JSON file with answers to pre-fill.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Print the full step summary before every prompt.
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also print the submitted answers as CBOR hex.
        #[arg(long)]
        cbor: bool,
    },
    /// Check a form definition for authoring mistakes.
    Check {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
    },
    /// Print the JSON Schema of the form definition format.
    Schema,
    /// Print the answer map a form starts from.
    Answers {
        /// Path to the form definition JSON (defaults to the built-in profile form).
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            spec,
            answers,
            verbose,
            cbor,
        } => run_wizard(spec, answers, verbose, cbor),
        Command::Check { spec } => run_check(&spec),
        Command::Schema => run_schema(),
        Command::Answers { spec } => run_answers(spec),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_spec(path: Option<&Path>) -> CliResult<FormSpec> {
    let spec: FormSpec = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
            serde_json::from_str(&raw)
                .map_err(|err| format!("invalid form spec {}: {}", path.display(), err))?
        }
        None => serde_json::from_str(DEFAULT_SPEC)?,
    };
    debug!(form = %spec.id, questions = spec.questions.len(), "loaded form spec");
    Ok(spec)
}

fn load_answers(path: &Path) -> CliResult<Answers> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let value = serde_json::from_str(&raw)
        .map_err(|err| format!("invalid answers {}: {}", path.display(), err))?;
    Ok(Answers::from_value(value)?)
}

fn ensure_clean(spec: &FormSpec) -> CliResult<()> {
    let report = lint(spec);
    if report.is_clean() {
        return Ok(());
    }
    for error in &report.errors {
        eprintln!("  - {}", error);
    }
    Err(format!(
        "form '{}' has {} problem(s)",
        spec.id,
        report.errors.len()
    )
    .into())
}

fn run_wizard(
    spec_path: Option<PathBuf>,
    answers_path: Option<PathBuf>,
    verbose: bool,
    cbor: bool,
) -> CliResult<()> {
    let spec = load_spec(spec_path.as_deref())?;
    ensure_clean(&spec)?;
    let mut wizard = Wizard::new(spec);
    if let Some(path) = answers_path {
        wizard = wizard.with_answers(&load_answers(&path)?);
        for error in validate_all(&wizard.spec().questions, wizard.answers()) {
            warn!(
                question = %error.question_id,
                reason = %error.message,
                "prefilled answer fails validation"
            );
        }
    }

    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose), cbor);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match run_session(&mut wizard, &mut presenter, stdin.lock(), &mut stdout)? {
        SessionOutcome::Submitted(answers) => {
            debug!(entries = answers.len(), "session submitted");
            Ok(())
        }
        SessionOutcome::Empty => Ok(()),
        SessionOutcome::Aborted => Err("wizard stopped before submission".into()),
    }
}

fn run_check(path: &Path) -> CliResult<()> {
    let spec = load_spec(Some(path))?;
    ensure_clean(&spec)?;
    println!(
        "Form '{}' is valid ({} questions)",
        spec.id,
        spec.questions.len()
    );
    Ok(())
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(FormSpec);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_answers(path: Option<PathBuf>) -> CliResult<()> {
    let spec = load_spec(path.as_deref())?;
    let answers = build_initial_values(&spec.questions);
    println!("{}", answers.to_json_pretty()?);
    Ok(())
}
