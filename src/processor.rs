use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::ProcessorConfig;
use crate::environment::{detect_form_environment, Environment};
use crate::error::FormError;
use crate::files::{read_text, write_text};
use crate::html::{replace_form_id_in_html, replace_remote_urls};
use crate::payload::{change_form_id, embed_form_data, extract_form_data};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
  Start,
  EnvironmentDetected,
  UrlsRewritten,
  IdRewrittenInHtml,
  PayloadDecoded,
  PayloadIdChanged,
  Persisted,
  Failed,
}

// A run never panics; failures end up in `error`.
#[derive(Debug)]
pub struct ProcessReport {
  pub environment: Environment,
  pub output_path: PathBuf,
  // last step that completed
  pub reached: Stage,
  pub error: Option<FormError>,
}

impl ProcessReport {
  fn new(output_path: PathBuf) -> Self {
    Self {
      environment: Environment::Unknown,
      output_path,
      reached: Stage::Start,
      error: None,
    }
  }

  fn fail(mut self, err: FormError) -> Self {
    self.error = Some(err);
    self
  }

  pub fn stage(&self) -> Stage {
    match self.error {
      Some(_) => Stage::Failed,
      None => self.reached,
    }
  }

  pub fn succeeded(&self) -> bool {
    self.stage() == Stage::Persisted
  }

  pub fn local_copy_written(&self) -> bool {
    self.reached >= Stage::IdRewrittenInHtml
  }
}

// Markup is rewritten and written first; the payload is decoded from the untouched
// source and spliced into that written copy.
pub fn process_form(
  config: &ProcessorConfig,
  source_file_name: &str,
  new_form_id: &str,
) -> ProcessReport {
  let source_path = config.source_path(source_file_name);
  let mut report = ProcessReport::new(config.output_path(new_form_id));

  info!("📁 Using source file: {}", source_file_name);

  let source = read_text(&source_path);
  match &source {
    Ok(html) => {
      report.environment = detect_form_environment(html);
      info!(
        "🌍 Source form environment: {}",
        report.environment.as_str().to_uppercase()
      );
    }
    Err(err) => warn!("⚠️  Could not detect source form environment: {}", err),
  }
  report.reached = Stage::EnvironmentDetected;

  info!("🔄 Creating local copy from source...");
  let source = match source {
    Ok(html) => html,
    Err(err) => {
      error!("Error creating local copy: {}", err);
      return report.fail(err);
    }
  };

  let local_copy = replace_remote_urls(&source);
  report.reached = Stage::UrlsRewritten;

  let local_copy = replace_form_id_in_html(&local_copy, Some(new_form_id), report.environment);
  if let Err(err) = write_text(&report.output_path, &local_copy) {
    error!("Error creating local copy: {}", err);
    return report.fail(err);
  }
  report.reached = Stage::IdRewrittenInHtml;

  let mut record = match extract_form_data(&source) {
    Ok(record) => record,
    Err(err) => {
      error!("Error extracting data from HTML ({}): {}", err.kind(), err);
      error!("❌ Failed to extract data from HTML file");
      return report.fail(err);
    }
  };
  info!("📄 Reading form data from: {}", source_file_name);
  report.reached = Stage::PayloadDecoded;

  change_form_id(&mut record, Some(new_form_id));
  report.reached = Stage::PayloadIdChanged;

  info!("💾 Writing modified data back to HTML file...");
  let persisted = embed_form_data(&local_copy, &record)
    .and_then(|html| write_text(&report.output_path, &html));
  if let Err(err) = persisted {
    error!("Error writing data to HTML: {}", err);
    error!("❌ Failed to update file");
    return report.fail(err);
  }
  report.reached = Stage::Persisted;

  info!(
    "✅ Successfully created local copy {}",
    config.output_file_name(new_form_id)
  );
  report
}
