//! Local mirrors of entities owned by the call provider.
//!
//! Assistants and phone numbers are keyed by the identifier the provider
//! assigned them; that identifier is unique locally and is the upsert key
//! used when syncing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Assistant ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assistant {
  pub id:                    Uuid,
  pub name:                  String,
  pub provider_assistant_id: String,
  pub is_active:             bool,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAssistant {
  pub name:                  String,
  pub provider_assistant_id: String,
  pub is_active:             bool,
}

#[derive(Debug, Clone, Default)]
pub struct AssistantPatch {
  pub name:                  Option<String>,
  pub provider_assistant_id: Option<String>,
  pub is_active:             Option<bool>,
}

// ─── Phone number ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
  pub id:                       Uuid,
  pub name:                     String,
  pub provider_phone_number_id: String,
  pub display_number:           Option<String>,
  pub is_active:                bool,
  pub created_at:               DateTime<Utc>,
  pub updated_at:               DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPhoneNumber {
  pub name:                     String,
  pub provider_phone_number_id: String,
  pub display_number:           Option<String>,
  pub is_active:                bool,
}

#[derive(Debug, Clone, Default)]
pub struct PhoneNumberPatch {
  pub name:                     Option<String>,
  pub provider_phone_number_id: Option<String>,
  /// `Some(None)` clears the display number.
  pub display_number:           Option<Option<String>>,
  pub is_active:                Option<bool>,
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

/// Whether an upsert inserted a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
  Created,
  Updated,
}
