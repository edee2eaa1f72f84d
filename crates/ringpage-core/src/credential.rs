//! Call-provider API credentials.
//!
//! The secret itself never leaves the server: [`Credential`] skips it when
//! serialised, and read endpoints hand out a [`CredentialSummary`] instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named bearer token for the call provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
  pub id:           Uuid,
  pub name:         String,
  #[serde(skip_serializing, default)]
  pub secret_value: String,
  pub is_active:    bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input for creating a credential. New credentials start active.
#[derive(Debug, Clone)]
pub struct NewCredential {
  pub name:         String,
  pub secret_value: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct CredentialPatch {
  pub name:         Option<String>,
  pub secret_value: Option<String>,
  pub is_active:    Option<bool>,
}

/// Read-side projection of a [`Credential`] that is safe to return.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSummary {
  pub id:           Uuid,
  pub name:         String,
  pub masked_value: String,
  pub is_active:    bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl From<&Credential> for CredentialSummary {
  fn from(c: &Credential) -> Self {
    Self {
      id:           c.id,
      name:         c.name.clone(),
      masked_value: mask_secret(&c.secret_value),
      is_active:    c.is_active,
      created_at:   c.created_at,
      updated_at:   c.updated_at,
    }
  }
}

/// Mask a secret for display: first and last four characters only.
///
/// Secrets of eight characters or fewer are fully starred.
pub fn mask_secret(secret: &str) -> String {
  mask_with_threshold(secret, 8)
}

/// Redact a secret for log output. Stricter than [`mask_secret`]: anything
/// up to ten characters is fully starred.
pub fn redact_for_log(secret: &str) -> String {
  mask_with_threshold(secret, 10)
}

fn mask_with_threshold(secret: &str, threshold: usize) -> String {
  let chars: Vec<char> = secret.chars().collect();
  if chars.is_empty() {
    return String::new();
  }
  if chars.len() <= threshold {
    return "********".to_string();
  }
  let head: String = chars[..4].iter().collect();
  let tail: String = chars[chars.len() - 4..].iter().collect();
  format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mask_short_and_long() {
    assert_eq!(mask_secret(""), "");
    assert_eq!(mask_secret("abcdefgh"), "********");
    assert_eq!(mask_secret("sk_live_1234567890"), "sk_l…7890");
  }

  #[test]
  fn redaction_uses_a_wider_threshold() {
    assert_eq!(redact_for_log("abcdefghij"), "********");
    assert_eq!(redact_for_log("abcdefghijk"), "abcd…hijk");
  }

  #[test]
  fn serialised_credential_has_no_secret() {
    let now = Utc::now();
    let c = Credential {
      id:           Uuid::new_v4(),
      name:         "prod".into(),
      secret_value: "super-secret-token".into(),
      is_active:    true,
      created_at:   now,
      updated_at:   now,
    };
    let json = serde_json::to_string(&c).unwrap();
    assert!(!json.contains("super-secret-token"), "{json}");

    let summary = serde_json::to_value(CredentialSummary::from(&c)).unwrap();
    assert_eq!(summary["maskedValue"], "supe…oken");
  }
}
