//! Admin JSON API for ringpage.
//!
//! Exposes an axum [`Router`] backed by any [`ConfigStore`] and
//! [`CallProvider`]. Authentication is the caller's responsibility: the
//! server mounts this router behind its admin-session guard.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/admin", ringpage_api::admin_router(store.clone(), provider.clone()))
//! ```

pub mod assistants;
pub mod credentials;
pub mod demo_pages;
pub mod error;
pub mod password;
pub mod phone_numbers;
pub mod sync;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use ringpage_core::store::ConfigStore;
use ringpage_provider::CallProvider;

pub use error::ApiError;

/// Shared state for admin handlers.
pub struct ApiState<S, P> {
  pub store:    Arc<S>,
  pub provider: Arc<P>,
}

impl<S, P> Clone for ApiState<S, P> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), provider: self.provider.clone() }
  }
}

/// Build the admin router for `store` and `provider`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn admin_router<S, P>(store: Arc<S>, provider: Arc<P>) -> Router<()>
where
  S: ConfigStore + 'static,
  P: CallProvider + 'static,
{
  Router::new()
    // Credentials
    .route(
      "/credentials",
      get(credentials::list::<S, P>).post(credentials::create::<S, P>),
    )
    .route(
      "/credentials/{id}",
      get(credentials::get_one::<S, P>)
        .put(credentials::update::<S, P>)
        .delete(credentials::delete::<S, P>),
    )
    // Assistants
    .route(
      "/assistants",
      get(assistants::list::<S, P>).post(assistants::create::<S, P>),
    )
    .route("/assistants/sync", post(sync::assistants::<S, P>))
    .route(
      "/assistants/{id}",
      get(assistants::get_one::<S, P>)
        .put(assistants::update::<S, P>)
        .delete(assistants::delete::<S, P>),
    )
    // Phone numbers
    .route(
      "/phone-numbers",
      get(phone_numbers::list::<S, P>).post(phone_numbers::create::<S, P>),
    )
    .route("/phone-numbers/sync", post(sync::phone_numbers::<S, P>))
    .route(
      "/phone-numbers/{id}",
      get(phone_numbers::get_one::<S, P>)
        .put(phone_numbers::update::<S, P>)
        .delete(phone_numbers::delete::<S, P>),
    )
    // Demo pages
    .route(
      "/demo-pages",
      get(demo_pages::list::<S, P>).post(demo_pages::create::<S, P>),
    )
    .route(
      "/demo-pages/{id}",
      get(demo_pages::get_one::<S, P>)
        .put(demo_pages::update::<S, P>)
        .delete(demo_pages::delete::<S, P>),
    )
    .route("/demo-pages/{id}/reset-calls", post(demo_pages::reset_calls::<S, P>))
    .with_state(ApiState { store, provider })
}

/// Trim `value` and check its length (in characters) lies in `min..=max`.
pub(crate) fn bounded(field: &str, value: &str, min: usize, max: usize) -> Result<String, ApiError> {
  let v = value.trim();
  let len = v.chars().count();
  if len < min || len > max {
    return Err(ApiError::Validation(format!(
      "{field} must be {min}-{max} characters"
    )));
  }
  Ok(v.to_string())
}

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
  D: serde::Deserializer<'de>,
  T: serde::Deserialize<'de>,
{
  <Option<T> as serde::Deserialize>::deserialize(d).map(Some)
}

#[cfg(test)]
mod tests;
