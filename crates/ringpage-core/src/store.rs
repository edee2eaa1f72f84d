//! The `ConfigStore` trait.
//!
//! Implemented by storage backends (e.g. `ringpage-store-sqlite`). The HTTP
//! layers depend on this abstraction, not on any concrete backend, and get
//! the store injected through router state.

use std::future::Future;

use uuid::Uuid;

use crate::{
  StoreError,
  credential::{Credential, CredentialPatch, NewCredential},
  demo_page::{DemoPage, DemoPageDraft},
  provider_entity::{
    Assistant, AssistantPatch, NewAssistant, NewPhoneNumber, PhoneNumber,
    PhoneNumberPatch, UpsertOutcome,
  },
};

/// Persistent storage for credentials, provider mirrors, and demo pages.
///
/// Lists are returned newest first. `update_*` and `delete_*` report a
/// missing id as `None` / `false` rather than an error. Unique-key
/// violations surface as errors whose [`StoreError::is_conflict`] is true.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ConfigStore: Send + Sync {
  type Error: StoreError;

  // ── Credentials ───────────────────────────────────────────────────────

  fn create_credential(
    &self,
    input: NewCredential,
  ) -> impl Future<Output = Result<Credential, Self::Error>> + Send + '_;

  fn get_credential(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + '_;

  fn list_credentials(
    &self,
  ) -> impl Future<Output = Result<Vec<Credential>, Self::Error>> + Send + '_;

  fn update_credential(
    &self,
    id: Uuid,
    patch: CredentialPatch,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + '_;

  fn delete_credential(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Assistants ────────────────────────────────────────────────────────

  fn create_assistant(
    &self,
    input: NewAssistant,
  ) -> impl Future<Output = Result<Assistant, Self::Error>> + Send + '_;

  fn get_assistant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Assistant>, Self::Error>> + Send + '_;

  fn list_assistants(
    &self,
  ) -> impl Future<Output = Result<Vec<Assistant>, Self::Error>> + Send + '_;

  fn update_assistant(
    &self,
    id: Uuid,
    patch: AssistantPatch,
  ) -> impl Future<Output = Result<Option<Assistant>, Self::Error>> + Send + '_;

  fn delete_assistant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert, or overwrite name and active flag of the row with the same
  /// provider assistant id.
  fn upsert_assistant(
    &self,
    input: NewAssistant,
  ) -> impl Future<Output = Result<(Assistant, UpsertOutcome), Self::Error>> + Send + '_;

  // ── Phone numbers ─────────────────────────────────────────────────────

  fn create_phone_number(
    &self,
    input: NewPhoneNumber,
  ) -> impl Future<Output = Result<PhoneNumber, Self::Error>> + Send + '_;

  fn get_phone_number(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PhoneNumber>, Self::Error>> + Send + '_;

  fn list_phone_numbers(
    &self,
  ) -> impl Future<Output = Result<Vec<PhoneNumber>, Self::Error>> + Send + '_;

  fn update_phone_number(
    &self,
    id: Uuid,
    patch: PhoneNumberPatch,
  ) -> impl Future<Output = Result<Option<PhoneNumber>, Self::Error>> + Send + '_;

  fn delete_phone_number(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert, or overwrite name, display number and active flag of the row
  /// with the same provider phone-number id.
  fn upsert_phone_number(
    &self,
    input: NewPhoneNumber,
  ) -> impl Future<Output = Result<(PhoneNumber, UpsertOutcome), Self::Error>> + Send + '_;

  // ── Demo pages ────────────────────────────────────────────────────────

  /// Persist a new page with `calls_made = 0`. The draft is stored as given;
  /// callers normalise and validate it first.
  fn create_demo_page(
    &self,
    draft: DemoPageDraft,
  ) -> impl Future<Output = Result<DemoPage, Self::Error>> + Send + '_;

  fn get_demo_page(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DemoPage>, Self::Error>> + Send + '_;

  /// Look up an active page by its (already normalised) slug.
  fn find_active_demo_page<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<DemoPage>, Self::Error>> + Send + 'a;

  fn list_demo_pages(
    &self,
  ) -> impl Future<Output = Result<Vec<DemoPage>, Self::Error>> + Send + '_;

  /// Replace every administrator-controlled column of a page. Never touches
  /// `calls_made` or the legacy variable map.
  fn update_demo_page(
    &self,
    id: Uuid,
    draft: DemoPageDraft,
  ) -> impl Future<Output = Result<Option<DemoPage>, Self::Error>> + Send + '_;

  fn delete_demo_page(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Atomically add one to `calls_made`. Returns `false` if the page no
  /// longer exists.
  fn increment_calls_made(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Set `calls_made` back to zero and return the page.
  fn reset_calls_made(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DemoPage>, Self::Error>> + Send + '_;
}
