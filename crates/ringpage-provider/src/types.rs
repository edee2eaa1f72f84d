//! Wire types exchanged with the provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /phone-numbers/call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
  #[serde(rename = "type")]
  pub kind:            &'static str,
  pub direction:       &'static str,
  pub assistant_id:    String,
  pub phone_number_id: String,
  pub to_number:       String,
  pub variable_values: BTreeMap<String, String>,
}

impl CallRequest {
  pub fn outbound_sip(
    assistant_id: impl Into<String>,
    phone_number_id: impl Into<String>,
    to_number: impl Into<String>,
    variable_values: BTreeMap<String, String>,
  ) -> Self {
    Self {
      kind: "sip",
      direction: "outbound",
      assistant_id: assistant_id.into(),
      phone_number_id: phone_number_id.into(),
      to_number: to_number.into(),
      variable_values,
    }
  }
}

/// What we keep from a successful call response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallResponse {
  pub call_id: Option<String>,
  pub status:  Option<String>,
  /// The full parsed body, or `Null` when it was not JSON.
  pub raw:     Value,
}

impl CallResponse {
  /// Interpret a success body. Never fails: a body that is not JSON, or
  /// lacks the expected keys, yields `None` for the missing parts.
  pub fn from_body(text: &str) -> Self {
    let Ok(raw) = serde_json::from_str::<Value>(text) else {
      return Self::default();
    };
    let call_id = scalar(&raw, "call_id").or_else(|| scalar(&raw, "id"));
    let status = scalar(&raw, "status");
    Self { call_id, status, raw }
  }
}

fn scalar(v: &Value, key: &str) -> Option<String> {
  match v.get(key)? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// One entry of `GET /assistants`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteAssistant {
  #[serde(default)]
  pub assistant_id: Option<String>,
  #[serde(default)]
  pub name:         Option<String>,
  #[serde(default)]
  pub status:       Option<String>,
}

/// One entry of `GET /phone-numbers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemotePhoneNumber {
  #[serde(default)]
  pub phone_number_id: Option<String>,
  #[serde(default)]
  pub friendly_name:   Option<String>,
  #[serde(default)]
  pub number:          Option<String>,
  #[serde(default)]
  pub status:          Option<String>,
}
