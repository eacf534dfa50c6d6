use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::info;

use crate::environment::{Environment, LOCAL_ORIGIN, PRODUCTION_ORIGIN, STAGING_ORIGIN};

static META_FORM_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(<meta name="formId" content=")([^"]*)(")"#).expect("meta formId pattern")
});

// Positional: whatever sits between `/id/` and `/resume"` is replaced.
static RESUME_LINK_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(href="[^"]*/id/)[^/]*(/resume")"#).expect("resume link pattern")
});

/* ====================== Remote origins ====================== */

pub fn replace_remote_urls(html: &str) -> String {
  html
    .replace(STAGING_ORIGIN, LOCAL_ORIGIN)
    .replace(PRODUCTION_ORIGIN, LOCAL_ORIGIN)
}

/* ====================== Form id in markup ====================== */

pub fn find_meta_form_id(html: &str) -> Option<&str> {
  META_FORM_ID
    .captures(html)
    .and_then(|c| c.get(2))
    .map(|m| m.as_str())
}

/// Rewrite the form id in every `formId` meta tag and every `.../id/<X>/resume` link.
///
/// `environment` only labels the diagnostic for the old id. A missing or empty
/// `new_form_id` returns the document untouched and logs nothing.
pub fn replace_form_id_in_html(
  html: &str,
  new_form_id: Option<&str>,
  environment: Environment,
) -> String {
  let new_form_id = match new_form_id {
    Some(id) if !id.is_empty() => id,
    _ => return html.to_string(),
  };

  let old_form_id = find_meta_form_id(html).unwrap_or("unknown");

  let updated = META_FORM_ID.replace_all(html, |caps: &Captures| {
    format!("{}{}{}", &caps[1], new_form_id, &caps[3])
  });
  let updated = RESUME_LINK_ID.replace_all(&updated, |caps: &Captures| {
    format!("{}{}{}", &caps[1], new_form_id, &caps[2])
  });

  info!("🆔 ({}) id: {}", environment, old_form_id);
  info!("🆔 ({}) id : {}", Environment::Localhost, new_form_id);

  updated.into_owned()
}
