use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::FormError;
use crate::files::read_text;

/// Where snapshots are read from and local copies are written to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProcessorConfig {
  pub source_dir: PathBuf,
  pub output_dir: PathBuf,
  /// Appended to the new form id to name the local copy.
  pub output_suffix: String,
}

impl Default for ProcessorConfig {
  fn default() -> Self {
    Self {
      source_dir: PathBuf::from("source"),
      output_dir: PathBuf::from("output"),
      output_suffix: "-form.html".to_string(),
    }
  }
}

impl ProcessorConfig {
  /// Load a JSON config file. Keys left out keep their defaults.
  pub fn from_file(path: &Path) -> Result<Self, FormError> {
    let content = read_text(path)?;
    serde_json::from_str(&content)
      .map_err(|e| FormError::Parse(format!("failed to parse {}: {e}", path.display())))
  }

  pub fn source_path(&self, source_file_name: &str) -> PathBuf {
    self.source_dir.join(source_file_name)
  }

  pub fn output_file_name(&self, new_form_id: &str) -> String {
    format!("{}{}", new_form_id, self.output_suffix)
  }

  pub fn output_path(&self, new_form_id: &str) -> PathBuf {
    self.output_dir.join(self.output_file_name(new_form_id))
  }
}
