//! Demo pages — the aggregate a visitor-facing link is generated from.
//!
//! A page references one credential, one assistant and one phone number by
//! id; nothing is embedded. Its form definition (`fields`) and the mapping
//! from submitted values to provider variables (`variables`) are replaced
//! wholesale on every edit.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, phone::has_digits, slug::normalize_slug};

/// Upper bound accepted for `max_calls`.
pub const MAX_CALLS_LIMIT: i64 = 100_000;

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The closed set of input kinds a demo form can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  #[default]
  Text,
  Email,
  Tel,
  Number,
  Select,
  Textarea,
}

impl FieldType {
  /// Check a non-blank submitted `value` against this field kind.
  ///
  /// Returns a short reason on failure; the caller prefixes the label.
  pub fn check(self, value: &str, options: &[String]) -> Result<(), &'static str> {
    let value = value.trim();
    match self {
      FieldType::Text | FieldType::Textarea => Ok(()),
      FieldType::Email => {
        match value.split_once('@') {
          Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
          {
            Ok(())
          }
          _ => Err("must be a valid email address"),
        }
      }
      FieldType::Tel => {
        if has_digits(value) { Ok(()) } else { Err("must be a phone number") }
      }
      FieldType::Number => {
        value.parse::<f64>().map(|_| ()).map_err(|_| "must be a number")
      }
      FieldType::Select => {
        if options.is_empty() || options.iter().any(|o| o == value) {
          Ok(())
        } else {
          Err("must be one of the listed options")
        }
      }
    }
  }
}

/// One input on a demo form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoField {
  pub key:         String,
  pub label:       String,
  #[serde(rename = "type", default)]
  pub field_type:  FieldType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub placeholder: Option<String>,
  #[serde(default)]
  pub required:    bool,
  /// Only meaningful for [`FieldType::Select`].
  #[serde(default)]
  pub options:     Vec<String>,
}

// ─── Variables ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableSource {
  /// `value` is a literal.
  #[default]
  Static,
  /// `value` names a field whose submitted value is used.
  Field,
}

/// A named value sent to the provider with every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
  pub key:    String,
  #[serde(default)]
  pub source: VariableSource,
  pub value:  String,
}

/// How a page maps submissions onto provider variables.
///
/// Pages written by this service always carry a `List`. `Legacy` surfaces
/// rows from older builds that stored a provider-variable → field-key map;
/// it is only ever read. Serialised untagged: a list is a JSON array, a
/// legacy map a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableBindings {
  List(Vec<Variable>),
  Legacy(BTreeMap<String, String>),
}

impl Default for VariableBindings {
  fn default() -> Self { Self::List(Vec::new()) }
}

impl VariableBindings {
  /// Pick the binding a stored row resolves to: the list when it has
  /// entries, else the legacy map when it has entries, else an empty list.
  pub fn from_stored(list: Vec<Variable>, legacy: BTreeMap<String, String>) -> Self {
    if list.is_empty() && !legacy.is_empty() {
      Self::Legacy(legacy)
    } else {
      Self::List(list)
    }
  }

  /// The list form, or an empty list for legacy pages.
  pub fn list(&self) -> &[Variable] {
    match self {
      Self::List(v) => v,
      Self::Legacy(_) => &[],
    }
  }
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoPage {
  pub id:                Uuid,
  pub slug:              String,
  pub title:             Option<String>,
  pub credential_id:     Uuid,
  pub assistant_id:      Uuid,
  pub phone_number_id:   Uuid,
  pub fields:            Vec<DemoField>,
  pub call_to_field_key: String,
  pub variables:         VariableBindings,
  pub password_required: bool,
  #[serde(skip)]
  pub password_hash:     Option<String>,
  /// `None` means unlimited.
  pub max_calls:         Option<i64>,
  pub calls_made:        i64,
  pub is_active:         bool,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl DemoPage {
  /// `true` once the page has used up its quota.
  pub fn quota_exhausted(&self) -> bool {
    self.max_calls.is_some_and(|max| self.calls_made >= max)
  }

  pub fn field(&self, key: &str) -> Option<&DemoField> {
    self.fields.iter().find(|f| f.key == key)
  }

  /// The editable part of this page, as a starting point for an update.
  ///
  /// Legacy variable maps are not carried over: writing the draft back
  /// stores the (empty) list and leaves the legacy column alone.
  pub fn to_draft(&self) -> DemoPageDraft {
    DemoPageDraft {
      slug:              self.slug.clone(),
      title:             self.title.clone(),
      credential_id:     self.credential_id,
      assistant_id:      self.assistant_id,
      phone_number_id:   self.phone_number_id,
      fields:            self.fields.clone(),
      call_to_field_key: self.call_to_field_key.clone(),
      variables:         self.variables.list().to_vec(),
      password_required: self.password_required,
      password_hash:     self.password_hash.clone(),
      max_calls:         self.max_calls,
      is_active:         self.is_active,
    }
  }

  /// The projection shown to visitors.
  pub fn public_view(&self) -> PublicDemoPage {
    PublicDemoPage {
      id:                self.id,
      slug:              self.slug.clone(),
      title:             self.title.clone(),
      fields:            self.fields.clone(),
      password_required: self.password_required,
      max_calls:         self.max_calls,
      calls_made:        self.calls_made,
    }
  }
}

/// Visitor-safe projection of a [`DemoPage`]: no references, no variables,
/// no password material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDemoPage {
  pub id:                Uuid,
  pub slug:              String,
  pub title:             Option<String>,
  pub fields:            Vec<DemoField>,
  pub password_required: bool,
  pub max_calls:         Option<i64>,
  pub calls_made:        i64,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Everything an administrator controls on a page. Used for both create and
/// full-replace update; `calls_made` is deliberately absent.
#[derive(Debug, Clone)]
pub struct DemoPageDraft {
  pub slug:              String,
  pub title:             Option<String>,
  pub credential_id:     Uuid,
  pub assistant_id:      Uuid,
  pub phone_number_id:   Uuid,
  pub fields:            Vec<DemoField>,
  pub call_to_field_key: String,
  pub variables:         Vec<Variable>,
  pub password_required: bool,
  pub password_hash:     Option<String>,
  pub max_calls:         Option<i64>,
  pub is_active:         bool,
}

impl DemoPageDraft {
  /// Normalise free-text parts in place: slug canonicalised, strings
  /// trimmed, empty titles and placeholders dropped, and variable rows with
  /// a blank key or value removed.
  pub fn normalize(&mut self) {
    self.slug = normalize_slug(&self.slug);
    self.title = self
      .title
      .take()
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty());
    self.call_to_field_key = self.call_to_field_key.trim().to_string();

    for f in &mut self.fields {
      f.key = f.key.trim().to_string();
      f.label = f.label.trim().to_string();
      f.placeholder = f
        .placeholder
        .take()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
      f.options = f
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    }

    self.variables = std::mem::take(&mut self.variables)
      .into_iter()
      .map(|v| Variable {
        key:    v.key.trim().to_string(),
        source: v.source,
        value:  v.value.trim().to_string(),
      })
      .filter(|v| !v.key.is_empty() && !v.value.is_empty())
      .collect();

    if !self.password_required {
      self.password_hash = None;
    }
  }

  /// Enforce the save-time rules. Call after [`normalize`](Self::normalize).
  pub fn validate(&self) -> Result<()> {
    let invalid = |msg: String| Err(Error::Validation(msg));

    if self.slug.is_empty() {
      return invalid("slug is required".into());
    }
    if self.slug.chars().count() > 120 {
      return invalid("slug must be at most 120 characters".into());
    }
    if self.title.as_ref().is_some_and(|t| t.chars().count() > 80) {
      return invalid("title must be at most 80 characters".into());
    }
    if self.fields.is_empty() {
      return invalid("at least one field is required".into());
    }

    let mut keys = HashSet::new();
    for f in &self.fields {
      if f.key.is_empty() || f.key.chars().count() > 50 {
        return invalid("field keys must be 1-50 characters".into());
      }
      if f.label.is_empty() || f.label.chars().count() > 80 {
        return invalid(format!("field {:?} needs a label of 1-80 characters", f.key));
      }
      if !keys.insert(f.key.as_str()) {
        return invalid(format!("duplicate field key {:?}", f.key));
      }
      if f.field_type == FieldType::Select && f.options.is_empty() {
        return invalid(format!("select field {:?} needs at least one option", f.key));
      }
    }

    if !keys.contains(self.call_to_field_key.as_str()) {
      return invalid(format!(
        "callToFieldKey {:?} does not match any field",
        self.call_to_field_key
      ));
    }

    let mut var_keys = HashSet::new();
    for v in &self.variables {
      if !var_keys.insert(v.key.as_str()) {
        return invalid(format!("duplicate variable key {:?}", v.key));
      }
      if v.source == VariableSource::Field && !keys.contains(v.value.as_str()) {
        return invalid(format!(
          "variable {:?} references unknown field {:?}",
          v.key, v.value
        ));
      }
    }

    if let Some(max) = self.max_calls
      && !(1..=MAX_CALLS_LIMIT).contains(&max)
    {
      return invalid(format!("maxCalls must be between 1 and {MAX_CALLS_LIMIT}"));
    }

    if self.password_required && self.password_hash.is_none() {
      return invalid("a password is required when password protection is on".into());
    }

    Ok(())
  }
}

/// Validate a password chosen by an administrator for a page.
pub fn validate_page_password(password: &str) -> Result<()> {
  let len = password.chars().count();
  if !(4..=100).contains(&len) {
    return Err(Error::Validation(
      "password must be 4-100 characters".into(),
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn field(key: &str, field_type: FieldType) -> DemoField {
    DemoField {
      key:         key.into(),
      label:       key.to_uppercase(),
      field_type,
      placeholder: None,
      required:    false,
      options:     vec![],
    }
  }

  fn draft() -> DemoPageDraft {
    DemoPageDraft {
      slug:              "Acme Demo".into(),
      title:             Some("  ".into()),
      credential_id:     Uuid::new_v4(),
      assistant_id:      Uuid::new_v4(),
      phone_number_id:   Uuid::new_v4(),
      fields:            vec![field("phone", FieldType::Tel), field("name", FieldType::Text)],
      call_to_field_key: "phone".into(),
      variables:         vec![Variable {
        key:    "customer".into(),
        source: VariableSource::Field,
        value:  "name".into(),
      }],
      password_required: false,
      password_hash:     Some("stale".into()),
      max_calls:         None,
      is_active:         true,
    }
  }

  #[test]
  fn normalize_cleans_up_inputs() {
    let mut d = draft();
    d.variables.push(Variable { key: " ".into(), source: VariableSource::Static, value: "x".into() });
    d.variables.push(Variable { key: "empty".into(), source: VariableSource::Static, value: "  ".into() });
    d.normalize();

    assert_eq!(d.slug, "acme-demo");
    assert_eq!(d.title, None);
    assert_eq!(d.variables.len(), 1);
    assert_eq!(d.password_hash, None, "hash cleared when protection is off");
    d.validate().unwrap();
  }

  #[test]
  fn call_target_must_reference_a_field() {
    let mut d = draft();
    d.call_to_field_key = "mobile".into();
    d.normalize();
    assert!(matches!(d.validate(), Err(Error::Validation(m)) if m.contains("callToFieldKey")));
  }

  #[test]
  fn duplicate_variable_keys_are_rejected() {
    let mut d = draft();
    d.variables.push(Variable {
      key:    "customer".into(),
      source: VariableSource::Static,
      value:  "Ann".into(),
    });
    d.normalize();
    assert!(matches!(d.validate(), Err(Error::Validation(m)) if m.contains("duplicate variable")));
  }

  #[test]
  fn field_variable_must_reference_a_field() {
    let mut d = draft();
    d.variables[0].value = "nickname".into();
    d.normalize();
    assert!(d.validate().is_err());
  }

  #[test]
  fn password_required_needs_a_hash() {
    let mut d = draft();
    d.password_required = true;
    d.password_hash = None;
    d.normalize();
    assert!(d.validate().is_err());

    d.password_hash = Some("$argon2id$...".into());
    d.validate().unwrap();
  }

  #[test]
  fn max_calls_bounds() {
    let mut d = draft();
    d.normalize();
    d.max_calls = Some(0);
    assert!(d.validate().is_err());
    d.max_calls = Some(MAX_CALLS_LIMIT + 1);
    assert!(d.validate().is_err());
    d.max_calls = Some(5);
    d.validate().unwrap();
  }

  #[test]
  fn select_without_options_is_rejected() {
    let mut d = draft();
    d.fields.push(field("plan", FieldType::Select));
    d.normalize();
    assert!(d.validate().is_err());
  }

  #[test]
  fn field_type_checks() {
    let opts = vec!["basic".to_string(), "pro".to_string()];
    assert!(FieldType::Email.check("ann@example.com", &[]).is_ok());
    assert!(FieldType::Email.check("ann.example.com", &[]).is_err());
    assert!(FieldType::Email.check("@example.com", &[]).is_err());
    assert!(FieldType::Number.check(" 42.5 ", &[]).is_ok());
    assert!(FieldType::Number.check("forty", &[]).is_err());
    assert!(FieldType::Tel.check("(555) 123", &[]).is_ok());
    assert!(FieldType::Tel.check("n/a", &[]).is_err());
    assert!(FieldType::Select.check("pro", &opts).is_ok());
    assert!(FieldType::Select.check("enterprise", &opts).is_err());
    assert!(FieldType::Textarea.check("anything at all", &[]).is_ok());
  }

  #[test]
  fn bindings_prefer_the_list() {
    let list = vec![Variable { key: "a".into(), source: VariableSource::Static, value: "1".into() }];
    let legacy: BTreeMap<String, String> = [("b".to_string(), "f".to_string())].into();

    assert!(matches!(
      VariableBindings::from_stored(list.clone(), legacy.clone()),
      VariableBindings::List(l) if l == list
    ));
    assert!(matches!(
      VariableBindings::from_stored(vec![], legacy.clone()),
      VariableBindings::Legacy(m) if m == legacy
    ));
    assert_eq!(VariableBindings::from_stored(vec![], BTreeMap::new()), VariableBindings::default());
  }

  #[test]
  fn field_json_uses_type_key() {
    let f: DemoField = serde_json::from_str(
      r#"{"key":"plan","label":"Plan","type":"select","options":["a"]}"#,
    )
    .unwrap();
    assert_eq!(f.field_type, FieldType::Select);
    assert!(!f.required);
    let back = serde_json::to_value(&f).unwrap();
    assert_eq!(back["type"], "select");
  }
}
