use std::fmt;

pub const STAGING_ORIGIN: &str = "https://forms-staging.cdssandbox.xyz";
pub const PRODUCTION_ORIGIN: &str = "https://forms-formulaires.alpha.canada.ca";
pub const LOCAL_ORIGIN: &str = "http://localhost:3000";

/// Where a saved form page was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
  Staging,
  Production,
  Localhost,
  Unknown,
}

impl Environment {
  pub fn as_str(&self) -> &'static str {
    match self {
      Environment::Staging => "staging",
      Environment::Production => "production",
      Environment::Localhost => "localhost",
      Environment::Unknown => "unknown",
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Classify a document by the first origin literal it contains.
/// Staging wins over production, which wins over localhost.
pub fn detect_form_environment(html: &str) -> Environment {
  if html.contains(STAGING_ORIGIN) {
    Environment::Staging
  } else if html.contains(PRODUCTION_ORIGIN) {
    Environment::Production
  } else if html.contains(LOCAL_ORIGIN) {
    Environment::Localhost
  } else {
    Environment::Unknown
  }
}
