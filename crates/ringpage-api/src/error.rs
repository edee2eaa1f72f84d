//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Shared by the admin router and the visitor routes in `ringpage-server`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use ringpage_core::StoreError;
use serde_json::{Value, json};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Unauthorized(String),

  /// The page is password-protected and no valid session was presented.
  #[error("password required")]
  PasswordRequired,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  QuotaExceeded(String),

  /// The stored configuration cannot serve the request.
  #[error("{0}")]
  Configuration(String),

  #[error("{message}")]
  Provider {
    status:  u16,
    message: String,
    details: Value,
  },

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  /// Wrap a store failure; unique-key violations become [`ApiError::Conflict`]
  /// with `conflict` as the message.
  pub fn store<E: StoreError>(e: E, conflict: &str) -> Self {
    if e.is_conflict() {
      ApiError::Conflict(conflict.to_string())
    } else {
      ApiError::Store(Box::new(e))
    }
  }

  /// Wrap a provider failure under `message`.
  pub fn provider(message: &str, e: ringpage_provider::Error) -> Self {
    use ringpage_provider::Error as P;
    let (status, details) = match e {
      P::Status { status, body } => (status, body),
      P::Http(e) if e.is_timeout() => (504, Value::String(e.to_string())),
      P::Http(e) => (502, Value::String(e.to_string())),
      P::Malformed(m) => (502, Value::String(m)),
    };
    ApiError::Provider { status, message: message.to_string(), details }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) | ApiError::PasswordRequired => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::QuotaExceeded(_) => StatusCode::FORBIDDEN,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Provider { status, .. } => StatusCode::from_u16(*status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY),
      ApiError::Configuration(_) | ApiError::Store(_) | ApiError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl From<ringpage_core::Error> for ApiError {
  fn from(e: ringpage_core::Error) -> Self {
    match e {
      ringpage_core::Error::Validation(m) => ApiError::Validation(m),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let body = match &self {
      ApiError::PasswordRequired => json!({ "error": "Password required", "passwordRequired": true }),
      ApiError::Provider { message, details, .. } => json!({ "error": message, "details": details }),
      ApiError::Store(_) | ApiError::Internal(_) => json!({ "error": "Internal server error" }),
      other => json!({ "error": other.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
