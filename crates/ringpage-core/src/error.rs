//! Error types for `ringpage-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected by a save-time or submission-time rule. The message is
  /// safe to show to the caller.
  #[error("{0}")]
  Validation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised by a [`ConfigStore`](crate::store::ConfigStore) backend.
///
/// The HTTP layer only needs to tell a uniqueness violation apart from every
/// other storage fault; everything else is reported as an internal error.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when a write was rejected by a unique-key constraint.
  fn is_conflict(&self) -> bool;
}
