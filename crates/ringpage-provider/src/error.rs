//! Error type for `ringpage-provider`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The request never produced a response (connect failure, timeout, …).
  #[error("provider request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The provider answered with a non-success status.
  #[error("provider returned HTTP {status}")]
  Status {
    status: u16,
    /// Parsed JSON when the body was JSON, the raw text otherwise.
    body:   serde_json::Value,
  },

  /// A success response whose body could not be understood.
  #[error("unexpected provider response: {0}")]
  Malformed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
