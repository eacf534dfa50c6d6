use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while localizing a saved form page.
#[derive(Debug, Error)]
pub enum FormError {
  /// A source file, directory or required HTML anchor is absent.
  #[error("not found: {0}")]
  NotFound(String),
  /// Malformed JSON, base64 or UTF-8 in the embedded payload.
  #[error("parse error: {0}")]
  Parse(String),
  /// Rejected user input (form id, file selection, arguments).
  #[error("invalid input: {0}")]
  Validation(String),
  #[error("io error on {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl FormError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    let path = path.into();
    if source.kind() == io::ErrorKind::NotFound {
      return FormError::NotFound(format!("{}: {}", path.display(), source));
    }
    FormError::Io { path, source }
  }

  /// Short taxonomy label used in diagnostics.
  pub fn kind(&self) -> &'static str {
    match self {
      FormError::NotFound(_) => "NotFoundError",
      FormError::Parse(_) => "ParseError",
      FormError::Validation(_) => "ValidationError",
      FormError::Io { .. } => "IOError",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_maps_to_not_found() {
    let err = FormError::io("source/a.html", io::Error::from(io::ErrorKind::NotFound));
    assert!(matches!(err, FormError::NotFound(_)));
    assert_eq!(err.kind(), "NotFoundError");
  }

  #[test]
  fn other_io_errors_keep_path() {
    let err = FormError::io("output/x.html", io::Error::from(io::ErrorKind::PermissionDenied));
    assert_eq!(err.kind(), "IOError");
    assert!(err.to_string().contains("output/x.html"));
  }
}
