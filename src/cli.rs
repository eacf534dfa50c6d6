use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::LazyLock;

use clap::{CommandFactory, Parser};
use regex::Regex;
use tracing::{error, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::ProcessorConfig;
use crate::error::FormError;
use crate::files::list_source_files;
use crate::processor::{process_form, ProcessReport};

static FORM_ID_SHAPE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("form id pattern"));

#[derive(Debug, Parser)]
#[command(
  name = "form-localizer",
  version,
  about = "Create a local copy of a saved form page under a new form id",
  long_about = "Rewrites staging/production origins to http://localhost:3000, replaces the form id in the \
                formId meta tag, the resume link and the embedded form-data payload, and writes \
                <outputDir>/<FORM_ID>-form.html.",
  after_help = "Missing arguments are prompted for unless --batch is given.\n\
                Example: form-localizer staging-form.html cmdyu74gx0001nbrybeq9r4kt"
)]
pub struct Cli {
  /// File name of the saved form page inside the source directory
  pub source_file: Option<String>,
  /// New form id (letters, digits, `-` and `_`)
  pub form_id: Option<String>,
  #[arg(long, help = "Never prompt; fail with usage when an argument is missing")]
  pub batch: bool,
  #[arg(long, value_name = "PATH", help = "JSON config file (sourceDir, outputDir, outputSuffix)")]
  pub config: Option<PathBuf>,
  #[arg(long = "source-dir", value_name = "DIR", help = "Override the source directory")]
  pub source_dir: Option<PathBuf>,
  #[arg(long = "output-dir", value_name = "DIR", help = "Override the output directory")]
  pub output_dir: Option<PathBuf>,
  #[arg(
    long = "log-level",
    default_value = "info",
    help = "Log filter used when RUST_LOG is not set"
  )]
  pub log_level: String,
}

/* ====================== Logging ====================== */

pub fn init_logging(level: &str) {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(level))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr),
    )
    .init();
}

/* ====================== Input validation ====================== */

/// Trim and check a form id against `[A-Za-z0-9_-]+`.
pub fn validate_form_id(raw: &str) -> Result<String, FormError> {
  let id = raw.trim();
  if id.is_empty() {
    return Err(FormError::Validation("Form ID cannot be empty".into()));
  }
  if !FORM_ID_SHAPE.is_match(id) {
    return Err(FormError::Validation(
      "Form ID should only contain letters, numbers, hyphens, and underscores".into(),
    ));
  }
  Ok(id.to_string())
}

// Ids given as arguments are taken as-is; only empty ids and path separators are refused.
pub fn check_form_id_arg(raw: &str) -> Result<String, FormError> {
  if raw.is_empty() {
    return Err(FormError::Validation("Form ID cannot be empty".into()));
  }
  if raw.contains(['/', '\\']) {
    return Err(FormError::Validation("Form ID cannot contain path separators".into()));
  }
  Ok(raw.to_string())
}

pub fn resolve_config(cli: &Cli) -> Result<ProcessorConfig, FormError> {
  let mut config = match &cli.config {
    Some(path) => ProcessorConfig::from_file(path)?,
    None => ProcessorConfig::default(),
  };
  if let Some(dir) = &cli.source_dir {
    config.source_dir = dir.clone();
  }
  if let Some(dir) = &cli.output_dir {
    config.output_dir = dir.clone();
  }
  Ok(config)
}

/* ====================== Prompts ====================== */

fn terminal_err(e: std::io::Error) -> FormError {
  FormError::io("<terminal>", e)
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, query: &str) -> Result<String, FormError> {
  write!(out, "{query}").map_err(terminal_err)?;
  out.flush().map_err(terminal_err)?;

  let mut line = String::new();
  let read = input.read_line(&mut line).map_err(terminal_err)?;
  if read == 0 {
    return Err(FormError::Validation("input closed before an answer was given".into()));
  }
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// List the snapshots and ask until a valid number or exact file name is given.
pub fn prompt_for_source_file<R: BufRead, W: Write>(
  input: &mut R,
  out: &mut W,
  source_files: &[String],
) -> Result<String, FormError> {
  if source_files.is_empty() {
    return Err(FormError::NotFound("No HTML files found in the source directory.".into()));
  }

  writeln!(out, "\n📁 Available source files:").map_err(terminal_err)?;
  for (i, file) in source_files.iter().enumerate() {
    writeln!(out, "  {}. {}", i + 1, file).map_err(terminal_err)?;
  }

  loop {
    let answer = ask(input, out, "\nSelect a source file (enter number or filename): ")?;
    let answer = answer.trim();

    if let Ok(n) = answer.parse::<usize>() {
      if (1..=source_files.len()).contains(&n) {
        return Ok(source_files[n - 1].clone());
      }
    }
    if let Some(found) = source_files.iter().find(|f| f.as_str() == answer) {
      return Ok(found.clone());
    }

    writeln!(out, "❌ Invalid selection. Please try again.").map_err(terminal_err)?;
  }
}

pub fn prompt_for_form_id<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String, FormError> {
  loop {
    let answer = ask(input, out, "\n🆔 Enter the new form ID: ")?;
    match validate_form_id(&answer) {
      Ok(id) => return Ok(id),
      Err(err) => writeln!(out, "❌ {}. Please try again.", validation_text(&err)).map_err(terminal_err)?,
    }
  }
}

fn validation_text(err: &FormError) -> String {
  match err {
    FormError::Validation(msg) => msg.clone(),
    other => other.to_string(),
  }
}

/* ====================== Entry ====================== */

fn print_usage<W: Write>(out: &mut W) -> Result<(), FormError> {
  let usage = Cli::command().render_usage();
  writeln!(out, "{usage}").map_err(terminal_err)?;
  writeln!(out, "Example: form-localizer staging-form.html cmdyu74gx0001nbrybeq9r4kt")
    .map_err(terminal_err)
}

/// Resolve the source file and form id (from args or prompts), then run the processor.
pub(crate) fn execute<R: BufRead, W: Write>(
  cli: Cli,
  input: &mut R,
  out: &mut W,
) -> Result<ProcessReport, FormError> {
  let config = resolve_config(&cli)?;

  let (source_file, form_id) = match (cli.source_file, cli.form_id) {
    (Some(source_file), Some(form_id)) => (source_file, check_form_id_arg(&form_id)?),
    _ if cli.batch => {
      print_usage(out)?;
      return Err(FormError::Validation(
        "both <SOURCE_FILE> and <FORM_ID> are required with --batch".into(),
      ));
    }
    (source_file, form_id) => {
      let source_file = match source_file {
        Some(name) => name,
        None => {
          let files = list_source_files(&config.source_dir).unwrap_or_else(|err| {
            warn!("Error reading source directory: {}", err);
            Vec::new()
          });
          prompt_for_source_file(input, out, &files)?
        }
      };
      let form_id = match form_id {
        Some(id) => check_form_id_arg(&id)?,
        None => prompt_for_form_id(input, out)?,
      };
      (source_file, form_id)
    }
  };

  Ok(process_form(&config, &source_file, &form_id))
}

pub fn run_with<R: BufRead, W: Write>(cli: Cli, input: &mut R, out: &mut W) -> ExitCode {
  match execute(cli, input, out) {
    Ok(report) if report.succeeded() => ExitCode::SUCCESS,
    Ok(_) => ExitCode::FAILURE,
    Err(err) => {
      error!("❌ {}", err);
      ExitCode::FAILURE
    }
  }
}
