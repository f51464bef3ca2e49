#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # aigrade
//!
//! Grades a free-text student answer from the command line, or serves the
//! grading form over HTTP.
//!
//! Engines are configured through the environment (a `.env` file is read if
//! present): `AIGRADE_EMBEDDING_ENDPOINT`, `AIGRADE_EMBEDDING_API_KEY` (or
//! `OPENAI_API_KEY`), `AIGRADE_EMBEDDING_MODEL`, `AIGRADE_LANGUAGETOOL_URL`,
//! `AIGRADE_LANGUAGE`, `AIGRADE_HTTP_TIMEOUT_SECS`, and `AIGRADE_BIND`.

use aigrade::{Evaluator, config, request::RawRequest, server};
use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Arguments of the `grade` subcommand.
#[derive(Debug, Clone)]
struct GradeArgs {
    /// Question text.
    question:  String,
    /// Student answer.
    answer:    String,
    /// Optional reference answer.
    reference: Option<String>,
    /// Minimum word count.
    min_words: Option<String>,
    /// Maximum word count.
    max_words: Option<String>,
    /// Print JSON instead of a table.
    json:      bool,
}

impl GradeArgs {
    /// Converts the arguments into an unvalidated request.
    fn into_raw(self) -> RawRequest {
        RawRequest {
            question_text:    Some(self.question),
            student_answer:   Some(self.answer),
            reference_answer: self.reference,
            min_words:        self.min_words,
            max_words:        self.max_words,
        }
    }
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a single answer
    Grade(GradeArgs),
    /// Run the HTTP service, optionally on a specific address
    Serve(Option<String>),
}

/// Global options plus the chosen command.
#[derive(Debug, Clone)]
struct Options {
    /// Log at DEBUG instead of INFO.
    verbose: bool,
    /// The command to run.
    cmd:     Cmd,
}

/// Parse the command line arguments and return the options
fn options() -> Options {
    let question = long("question")
        .short('q')
        .help("The question that was asked")
        .argument::<String>("TEXT");
    let answer = long("answer")
        .short('a')
        .help("The student's answer")
        .argument::<String>("TEXT");
    let reference = long("reference")
        .short('r')
        .help("A model answer to measure relevance against")
        .argument::<String>("TEXT")
        .optional();
    let min_words = long("min-words")
        .help("Minimum word count (0 for none)")
        .argument::<String>("N")
        .optional();
    let max_words = long("max-words")
        .help("Maximum word count (0 for none)")
        .argument::<String>("N")
        .optional();
    let json = long("json").help("Print the result as JSON").switch();

    let grade = construct!(GradeArgs {
        question,
        answer,
        reference,
        min_words,
        max_words,
        json
    })
    .to_options()
    .command("grade")
    .help("Grade a student answer")
    .map(Cmd::Grade);

    let bind = long("bind")
        .help("Address to listen on, overrides AIGRADE_BIND")
        .argument::<String>("ADDR")
        .optional();
    let serve = construct!(Cmd::Serve(bind))
        .to_options()
        .command("serve")
        .help("Serve the grading form over HTTP");

    let verbose = short('v')
        .long("verbose")
        .help("Log debug output")
        .switch();
    let cmd = construct!([grade, serve]);

    construct!(Options { verbose, cmd })
        .to_options()
        .descr("Rubric grader for free-text student answers")
        .run()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let config = config::ensure_initialized()?;
    let evaluator = Evaluator::from_config(&config);

    match opts.cmd {
        Cmd::Grade(args) => {
            let json = args.json;
            let input = args.into_raw().into_grading_input()?;
            let output = tokio::task::spawn_blocking(move || evaluator.evaluate(&input))
                .await
                .context("Evaluation task failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", output.to_table());
                println!("\n{}", output.automated_feedback);
                for error in output.errors.iter().flatten() {
                    eprintln!("review: {error}");
                }
            }
        }
        Cmd::Serve(bind) => {
            let bind = bind.unwrap_or_else(|| config.bind().to_string());
            server::serve(evaluator, &bind).await?;
        }
    };

    Ok(())
}
