//! Client for the outbound-call provider's HTTP API.
//!
//! [`CallProvider`] is the seam the server dispatches through;
//! [`ProviderClient`] is the reqwest-backed implementation used in
//! production. Tests substitute their own implementation.

use std::future::Future;

mod client;
pub mod error;
pub mod types;

pub use client::{DEFAULT_BASE_URL, ProviderClient, ProviderConfig};
pub use error::{Error, Result};
pub use types::{CallRequest, CallResponse, RemoteAssistant, RemotePhoneNumber};

/// Operations the server needs from the call provider. Every call carries
/// the bearer secret of the credential it acts on behalf of.
pub trait CallProvider: Send + Sync {
  /// Place one outbound call.
  fn start_call<'a>(
    &'a self,
    secret: &'a str,
    request: &'a CallRequest,
  ) -> impl Future<Output = Result<CallResponse>> + Send + 'a;

  /// Active assistants visible to `secret`.
  fn list_assistants<'a>(
    &'a self,
    secret: &'a str,
  ) -> impl Future<Output = Result<Vec<RemoteAssistant>>> + Send + 'a;

  /// Active phone numbers visible to `secret`.
  fn list_phone_numbers<'a>(
    &'a self,
    secret: &'a str,
  ) -> impl Future<Output = Result<Vec<RemotePhoneNumber>>> + Send + 'a;
}
