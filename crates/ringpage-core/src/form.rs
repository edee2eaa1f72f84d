//! Visitor form submissions.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// The values a visitor submitted, keyed by field key.
///
/// Built from an arbitrary JSON object: strings are kept verbatim, numbers
/// and booleans are rendered with their JSON text, and `null`, arrays and
/// objects are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
  pub fn new() -> Self { Self::default() }

  /// Value for `key` exactly as submitted.
  pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(String::as_str) }

  /// Value for `key`, or `None` when it is missing or only whitespace.
  pub fn non_blank(&self, key: &str) -> Option<&str> {
    self.get(key).filter(|v| !v.trim().is_empty())
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<Map<String, Value>> for FormData {
  fn from(map: Map<String, Value>) -> Self {
    let inner = map
      .into_iter()
      .filter_map(|(k, v)| {
        let s = match v {
          Value::String(s) => s,
          Value::Number(n) => n.to_string(),
          Value::Bool(b) => b.to_string(),
          Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        Some((k, s))
      })
      .collect();
    Self(inner)
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn scalar_values_are_stringified() {
    let form: FormData = serde_json::from_value(json!({
      "name":  "Ann",
      "age":   42,
      "optIn": true,
      "gone":  null,
      "list":  ["a"],
    }))
    .unwrap();

    assert_eq!(form.get("name"), Some("Ann"));
    assert_eq!(form.get("age"), Some("42"));
    assert_eq!(form.get("optIn"), Some("true"));
    assert_eq!(form.get("gone"), None);
    assert_eq!(form.get("list"), None);
    assert_eq!(form.len(), 3);
  }

  #[test]
  fn blank_values_are_not_non_blank() {
    let form: FormData = [("a", "  "), ("b", ""), ("c", " x ")].into_iter().collect();
    assert_eq!(form.non_blank("a"), None);
    assert_eq!(form.non_blank("b"), None);
    assert_eq!(form.non_blank("c"), Some(" x "));
    assert_eq!(form.non_blank("missing"), None);
  }
}
