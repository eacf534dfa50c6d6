//! Localize a saved hosted-form page: point its origins at the local dev server,
//! give it a new form id and re-embed the form-data payload under that id.

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod files;
pub mod html;
pub mod payload;
pub mod processor;

use std::io;
use std::process::ExitCode;

use clap::Parser;

pub use config::ProcessorConfig;
pub use environment::{detect_form_environment, Environment};
pub use error::FormError;
pub use html::{replace_form_id_in_html, replace_remote_urls};
pub use payload::{change_form_id, embed_form_data, extract_form_data, FormRecord};
pub use processor::{process_form, ProcessReport, Stage};

/* ====================== Entry point wired for main.rs ====================== */

pub fn run() -> ExitCode {
  let cli = cli::Cli::parse();
  cli::init_logging(&cli.log_level);

  let stdin = io::stdin();
  let mut input = stdin.lock();
  let mut out = io::stdout();
  cli::run_with(cli, &mut input, &mut out)
}
