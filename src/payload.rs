use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::error::FormError;

// Field order is kept as found in the document.
pub type FormRecord = Value;

// First `<script ... id="form-data" ...>` element; content may span lines.
static FORM_DATA_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?s)(<script[^>]*id="form-data"[^>]*>)(.*?)(</script>)"#)
    .expect("form-data script pattern")
});

/* ====================== Decode ====================== */

pub fn find_form_data_script(html: &str) -> Option<&str> {
  FORM_DATA_SCRIPT
    .captures(html)
    .and_then(|c| c.get(2))
    .map(|m| m.as_str())
}

pub fn extract_form_data(html: &str) -> Result<FormRecord, FormError> {
  let script = find_form_data_script(html)
    .ok_or_else(|| FormError::NotFound(r#"could not find script tag with id="form-data""#.into()))?;

  let wrapper: Value = serde_json::from_str(script)
    .map_err(|e| FormError::Parse(format!("form-data script is not valid JSON: {e}")))?;
  let encoded = wrapper
    .get("data")
    .and_then(|v| v.as_str())
    .ok_or_else(|| FormError::Parse("form-data script has no string `data` field".into()))?;

  // Strict: padded standard alphabet only. Surrounding whitespace is trimmed, inner
  // whitespace (line wrapping) and unpadded input are rejected.
  let bytes = STANDARD
    .decode(encoded.trim())
    .map_err(|e| FormError::Parse(format!("form-data payload is not valid base64: {e}")))?;
  let text = String::from_utf8(bytes)
    .map_err(|e| FormError::Parse(format!("decoded payload is not valid UTF-8: {e}")))?;

  serde_json::from_str(&text)
    .map_err(|e| FormError::Parse(format!("decoded payload is not valid JSON: {e}")))
}

/* ====================== Mutate ====================== */

// Only objects get an id; empty ids are ignored.
pub fn change_form_id(record: &mut FormRecord, new_form_id: Option<&str>) {
  let Some(new_form_id) = new_form_id.filter(|id| !id.is_empty()) else {
    return;
  };
  match record.as_object_mut() {
    Some(obj) => {
      obj.insert("id".to_string(), Value::String(new_form_id.to_string()));
    }
    None => debug!("form data is not an object, id left unchanged"),
  }
}

/* ====================== Encode ====================== */

// `{"data":"<base64 of compact JSON>"}`
pub fn encode_form_data(record: &FormRecord) -> Result<String, FormError> {
  let json = serde_json::to_string(record)
    .map_err(|e| FormError::Parse(format!("could not serialize form data: {e}")))?;
  let wrapper = serde_json::json!({ "data": STANDARD.encode(json.as_bytes()) });
  Ok(wrapper.to_string())
}

/// Replace the content of the form-data script element in `html` with `record`.
/// Everything outside that element is returned byte for byte.
pub fn embed_form_data(html: &str, record: &FormRecord) -> Result<String, FormError> {
  if !FORM_DATA_SCRIPT.is_match(html) {
    return Err(FormError::NotFound(
      r#"could not find script tag with id="form-data" to update"#.into(),
    ));
  }
  let body = encode_form_data(record)?;
  let updated = FORM_DATA_SCRIPT.replace(html, |caps: &Captures| {
    format!("{}{}{}", &caps[1], body, &caps[3])
  });
  Ok(updated.into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use serde_json::json;

  fn page_with(body: &str) -> String {
    format!(
      "<html><body>\n<script type=\"application/json\" id=\"form-data\" nonce=\"n\">{body}</script>\n<script>var x = 1;</script>\n</body></html>"
    )
  }

  fn wrap(record: &str) -> String {
    format!(r#"{{"data":"{}"}}"#, STANDARD.encode(record))
  }

  #[test]
  fn decodes_embedded_record() {
    let html = page_with(&wrap(r#"{"id":"abc123","title":"Test"}"#));
    let record = extract_form_data(&html).unwrap();
    assert_eq!(record, json!({"id": "abc123", "title": "Test"}));
  }

  #[test]
  fn script_content_may_span_lines() {
    let html = page_with(&format!("\n  {}\n", wrap(r#"{"id":"a"}"#)));
    assert_eq!(extract_form_data(&html).unwrap()["id"], "a");
  }

  #[test]
  fn missing_script_is_not_found() {
    let err = extract_form_data("<html><script>{}</script></html>").unwrap_err();
    assert!(matches!(err, FormError::NotFound(_)));
  }

  #[test]
  fn invalid_wrapper_json_is_parse_error() {
    let err = extract_form_data(&page_with("{not json")).unwrap_err();
    assert!(matches!(err, FormError::Parse(ref m) if m.contains("not valid JSON")));
  }

  #[test]
  fn missing_data_field_is_parse_error() {
    let err = extract_form_data(&page_with(r#"{"payload":"e30="}"#)).unwrap_err();
    assert!(matches!(err, FormError::Parse(ref m) if m.contains("`data`")));
  }

  #[test]
  fn malformed_base64_yields_no_record() {
    let result = extract_form_data(&page_with(r#"{"data":"%%%not-base64%%%"}"#));
    assert!(matches!(result, Err(FormError::Parse(ref m)) if m.contains("base64")));
  }

  #[test]
  fn non_utf8_payload_is_parse_error() {
    let body = format!(r#"{{"data":"{}"}}"#, STANDARD.encode([0xffu8, 0xfe, 0x00]));
    let err = extract_form_data(&page_with(&body)).unwrap_err();
    assert!(matches!(err, FormError::Parse(ref m) if m.contains("UTF-8")));
  }

  #[test]
  fn non_json_payload_is_parse_error() {
    let err = extract_form_data(&page_with(&wrap("hello"))).unwrap_err();
    assert!(matches!(err, FormError::Parse(ref m) if m.contains("decoded payload")));
  }

  #[test]
  fn change_id_only_when_given() {
    let mut record = json!({"id": "old", "title": "T"});
    change_form_id(&mut record, None);
    change_form_id(&mut record, Some(""));
    assert_eq!(record["id"], "old");
    change_form_id(&mut record, Some("new"));
    assert_eq!(record, json!({"id": "new", "title": "T"}));

    let mut list = json!([1, 2]);
    change_form_id(&mut list, Some("new"));
    assert_eq!(list, json!([1, 2]));
  }

  #[test]
  fn embed_then_extract_returns_the_record() {
    let html = page_with(&wrap(r#"{"id":"abc123"}"#));
    let record = json!({
      "id": "xyz789",
      "form": {"titleEn": "Café", "elements": [{"id": 1, "type": "textField"}]},
      "isPublished": false,
      "securityAttribute": null
    });
    let updated = embed_form_data(&html, &record).unwrap();
    assert_eq!(extract_form_data(&updated).unwrap(), record);
  }

  #[test]
  fn embed_touches_only_the_script_body() {
    let html = page_with(&wrap(r#"{"id":"a"}"#));
    let updated = embed_form_data(&html, &json!({"id": "b"})).unwrap();
    let expected = page_with(&wrap(r#"{"id":"b"}"#));
    assert_eq!(updated, expected);
  }

  #[test]
  fn key_order_survives_round_trip() {
    let original = r#"{"title":"T","id":"a","zeta":1,"alpha":2}"#;
    let html = page_with(&wrap(original));
    let mut record = extract_form_data(&html).unwrap();
    change_form_id(&mut record, Some("b"));
    let body = encode_form_data(&record).unwrap();
    assert_eq!(body, wrap(r#"{"title":"T","id":"b","zeta":1,"alpha":2}"#));
  }

  #[test]
  fn embed_without_script_is_not_found() {
    let err = embed_form_data("<html></html>", &json!({"id": "x"})).unwrap_err();
    assert!(matches!(err, FormError::NotFound(_)));
  }

  #[test]
  fn base64_is_strict_apart_from_outer_whitespace() {
    // "{}" is e30= in padded standard base64.
    let padded = extract_form_data(&page_with(r#"{"data":"  e30=\n"}"#)).unwrap();
    assert_eq!(padded, json!({}));

    let unpadded = extract_form_data(&page_with(r#"{"data":"e30"}"#));
    assert!(matches!(unpadded, Err(FormError::Parse(_))));

    let wrapped = format!(r#"{{"data":"{}"}}"#, "eyJp\nZCI6ImEifQ==".replace('\n', "\\n"));
    assert!(matches!(extract_form_data(&page_with(&wrapped)), Err(FormError::Parse(_))));
  }

  fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
      Just(Value::Null),
      any::<bool>().prop_map(Value::Bool),
      any::<i64>().prop_map(Value::from),
      any::<u64>().prop_map(Value::from),
      any::<String>().prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
      prop_oneof![
        prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
        prop::collection::vec((any::<String>(), inner), 0..6)
          .prop_map(|entries| Value::Object(entries.into_iter().collect())),
      ]
    })
  }

  proptest! {
    #[test]
    fn embed_then_extract_any_value(record in json_value()) {
      let html = page_with(&wrap(r#"{"id":"abc123"}"#));
      let updated = embed_form_data(&html, &record).unwrap();
      prop_assert_eq!(extract_form_data(&updated).unwrap(), record);
    }

    #[test]
    fn change_id_keeps_other_fields(
      fields in prop::collection::vec(("[a-z]{1,8}", json_value()), 0..6),
      new_id in "[A-Za-z0-9_-]{1,24}",
    ) {
      let mut record = Value::Object(fields.into_iter().collect());
      let before = record.clone();
      change_form_id(&mut record, Some(new_id.as_str()));

      let after = record.as_object().unwrap();
      prop_assert_eq!(&after["id"], &Value::String(new_id.clone()));
      for (key, value) in before.as_object().unwrap() {
        if key != "id" {
          prop_assert_eq!(&after[key], value);
        }
      }
    }
  }
}
