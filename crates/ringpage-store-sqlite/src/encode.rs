//! Conversions between domain types and the plain-text column values stored
//! in SQLite.
//!
//! Timestamps are RFC 3339 UTC strings with fixed microsecond precision, so
//! they sort lexicographically. Form fields and variable bindings are stored
//! as compact JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use ringpage_core::{
  credential::Credential,
  demo_page::{DemoField, DemoPage, Variable, VariableBindings},
  provider_entity::{Assistant, PhoneNumber},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Current time truncated to the precision the database keeps, so a value
/// returned from a write compares equal to the same row read back later.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_fields(fields: &[DemoField]) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

pub fn encode_variables(vars: &[Variable]) -> Result<String> {
  Ok(serde_json::to_string(vars)?)
}

/// Old rows may hold `NULL`-ish or empty text in JSON columns; treat those
/// as the empty value rather than failing the whole read.
fn decode_json_or_default<T>(s: &str) -> Result<T>
where
  T: serde::de::DeserializeOwned + Default,
{
  let s = s.trim();
  if s.is_empty() || s == "null" {
    return Ok(T::default());
  }
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const CREDENTIAL_COLUMNS: &str =
  "id, name, secret_value, is_active, created_at, updated_at";

/// Raw values read directly from a `credentials` row.
pub struct RawCredential {
  pub id:           String,
  pub name:         String,
  pub secret_value: String,
  pub is_active:    bool,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawCredential {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      name:         row.get(1)?,
      secret_value: row.get(2)?,
      is_active:    row.get(3)?,
      created_at:   row.get(4)?,
      updated_at:   row.get(5)?,
    })
  }

  pub fn into_credential(self) -> Result<Credential> {
    Ok(Credential {
      id:           decode_uuid(&self.id)?,
      name:         self.name,
      secret_value: self.secret_value,
      is_active:    self.is_active,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

pub const ASSISTANT_COLUMNS: &str =
  "id, name, provider_assistant_id, is_active, created_at, updated_at";

/// Raw values read directly from an `assistants` row.
pub struct RawAssistant {
  pub id:                    String,
  pub name:                  String,
  pub provider_assistant_id: String,
  pub is_active:             bool,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawAssistant {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                    row.get(0)?,
      name:                  row.get(1)?,
      provider_assistant_id: row.get(2)?,
      is_active:             row.get(3)?,
      created_at:            row.get(4)?,
      updated_at:            row.get(5)?,
    })
  }

  pub fn into_assistant(self) -> Result<Assistant> {
    Ok(Assistant {
      id:                    decode_uuid(&self.id)?,
      name:                  self.name,
      provider_assistant_id: self.provider_assistant_id,
      is_active:             self.is_active,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

pub const PHONE_NUMBER_COLUMNS: &str = "id, name, provider_phone_number_id, \
                                        display_number, is_active, created_at, \
                                        updated_at";

/// Raw values read directly from a `phone_numbers` row.
pub struct RawPhoneNumber {
  pub id:                       String,
  pub name:                     String,
  pub provider_phone_number_id: String,
  pub display_number:           Option<String>,
  pub is_active:                bool,
  pub created_at:               String,
  pub updated_at:               String,
}

impl RawPhoneNumber {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                       row.get(0)?,
      name:                     row.get(1)?,
      provider_phone_number_id: row.get(2)?,
      display_number:           row.get(3)?,
      is_active:                row.get(4)?,
      created_at:               row.get(5)?,
      updated_at:               row.get(6)?,
    })
  }

  pub fn into_phone_number(self) -> Result<PhoneNumber> {
    Ok(PhoneNumber {
      id:                       decode_uuid(&self.id)?,
      name:                     self.name,
      provider_phone_number_id: self.provider_phone_number_id,
      display_number:           self.display_number,
      is_active:                self.is_active,
      created_at:               decode_dt(&self.created_at)?,
      updated_at:               decode_dt(&self.updated_at)?,
    })
  }
}

pub const DEMO_PAGE_COLUMNS: &str = "id, slug, title, credential_id, assistant_id, \
                                     phone_number_id, fields_json, call_to_field_key, \
                                     variables_json, variable_values_json, \
                                     password_required, password_hash, max_calls, \
                                     calls_made, is_active, created_at, updated_at";

/// Raw values read directly from a `demo_pages` row.
pub struct RawDemoPage {
  pub id:                   String,
  pub slug:                 String,
  pub title:                Option<String>,
  pub credential_id:        String,
  pub assistant_id:         String,
  pub phone_number_id:      String,
  pub fields_json:          String,
  pub call_to_field_key:    String,
  pub variables_json:       Option<String>,
  pub variable_values_json: Option<String>,
  pub password_required:    bool,
  pub password_hash:        Option<String>,
  pub max_calls:            Option<i64>,
  pub calls_made:           i64,
  pub is_active:            bool,
  pub created_at:           String,
  pub updated_at:           String,
}

impl RawDemoPage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      slug:                 row.get(1)?,
      title:                row.get(2)?,
      credential_id:        row.get(3)?,
      assistant_id:         row.get(4)?,
      phone_number_id:      row.get(5)?,
      fields_json:          row.get(6)?,
      call_to_field_key:    row.get(7)?,
      variables_json:       row.get(8)?,
      variable_values_json: row.get(9)?,
      password_required:    row.get(10)?,
      password_hash:        row.get(11)?,
      max_calls:            row.get(12)?,
      calls_made:           row.get(13)?,
      is_active:            row.get(14)?,
      created_at:           row.get(15)?,
      updated_at:           row.get(16)?,
    })
  }

  pub fn into_demo_page(self) -> Result<DemoPage> {
    let fields: Vec<DemoField> = decode_json_or_default(&self.fields_json)?;
    let list: Vec<Variable> =
      decode_json_or_default(self.variables_json.as_deref().unwrap_or_default())?;
    let legacy: BTreeMap<String, String> =
      decode_json_or_default(self.variable_values_json.as_deref().unwrap_or_default())?;

    Ok(DemoPage {
      id: decode_uuid(&self.id)?,
      slug: self.slug,
      title: self.title,
      credential_id: decode_uuid(&self.credential_id)?,
      assistant_id: decode_uuid(&self.assistant_id)?,
      phone_number_id: decode_uuid(&self.phone_number_id)?,
      fields,
      call_to_field_key: self.call_to_field_key,
      variables: VariableBindings::from_stored(list, legacy),
      password_required: self.password_required,
      password_hash: self.password_hash,
      max_calls: self.max_calls,
      calls_made: self.calls_made,
      is_active: self.is_active,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
