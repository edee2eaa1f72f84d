//! Provider sync: pull the provider's active assistants or phone numbers
//! with a stored credential and upsert them locally by provider id.
//!
//! Per-item failures do not abort the run; they are collected into
//! `results.errors` and logged.

use axum::{Json, extract::State};
use ringpage_core::{
  credential::Credential,
  provider_entity::{NewAssistant, NewPhoneNumber, UpsertOutcome},
  store::ConfigStore,
};
use ringpage_provider::CallProvider;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBody {
  pub credential_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItemError {
  pub provider_id: Option<String>,
  pub error:       String,
}

#[derive(Debug, Default, Serialize)]
pub struct SyncResults {
  pub created: u32,
  pub updated: u32,
  pub errors:  Vec<SyncItemError>,
}

impl SyncResults {
  fn record(&mut self, outcome: UpsertOutcome) {
    match outcome {
      UpsertOutcome::Created => self.created += 1,
      UpsertOutcome::Updated => self.updated += 1,
    }
  }

  fn fail(&mut self, provider_id: Option<String>, error: String) {
    warn!(provider_id = provider_id.as_deref().unwrap_or("-"), %error, "sync item failed");
    self.errors.push(SyncItemError { provider_id, error });
  }
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
  pub success: bool,
  pub message: String,
  pub results: SyncResults,
}

async fn active_credential<S: ConfigStore>(store: &S, id: Uuid) -> Result<Credential, ApiError> {
  store
    .get_credential(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .filter(|c| c.is_active)
    .ok_or_else(|| ApiError::NotFound("credential not found or inactive".into()))
}

fn non_blank(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `POST /assistants/sync` — body: `{"credentialId":"…"}`
pub async fn assistants<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Json(body): Json<SyncBody>,
) -> Result<Json<SyncResponse>, ApiError> {
  let credential = active_credential(state.store.as_ref(), body.credential_id).await?;
  let remote = state
    .provider
    .list_assistants(&credential.secret_value)
    .await
    .map_err(|e| ApiError::provider("failed to fetch assistants from provider", e))?;

  let mut results = SyncResults::default();
  for item in &remote {
    let Some(provider_id) = non_blank(item.assistant_id.clone()) else {
      results.fail(None, "missing assistant_id".into());
      continue;
    };
    let input = NewAssistant {
      name:                  non_blank(item.name.clone())
        .unwrap_or_else(|| "Unnamed Assistant".into()),
      provider_assistant_id: provider_id.clone(),
      is_active:             item.status.as_deref() == Some("active"),
    };
    match state.store.upsert_assistant(input).await {
      Ok((_, outcome)) => results.record(outcome),
      Err(e) => results.fail(Some(provider_id), e.to_string()),
    }
  }

  info!(
    total = remote.len(),
    created = results.created,
    updated = results.updated,
    failed = results.errors.len(),
    "assistants synced"
  );
  Ok(Json(SyncResponse {
    success: true,
    message: format!("Synced {} assistants", remote.len()),
    results,
  }))
}

/// `POST /phone-numbers/sync` — body: `{"credentialId":"…"}`
pub async fn phone_numbers<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Json(body): Json<SyncBody>,
) -> Result<Json<SyncResponse>, ApiError> {
  let credential = active_credential(state.store.as_ref(), body.credential_id).await?;
  let remote = state
    .provider
    .list_phone_numbers(&credential.secret_value)
    .await
    .map_err(|e| ApiError::provider("failed to fetch phone numbers from provider", e))?;

  let mut results = SyncResults::default();
  for item in &remote {
    let Some(provider_id) = non_blank(item.phone_number_id.clone()) else {
      results.fail(None, "missing phone_number_id".into());
      continue;
    };
    let number = non_blank(item.number.clone());
    let input = NewPhoneNumber {
      name:                     non_blank(item.friendly_name.clone())
        .or_else(|| number.clone())
        .unwrap_or_else(|| "Unnamed Number".into()),
      provider_phone_number_id: provider_id.clone(),
      display_number:           number,
      is_active:                item.status.as_deref() == Some("active"),
    };
    match state.store.upsert_phone_number(input).await {
      Ok((_, outcome)) => results.record(outcome),
      Err(e) => results.fail(Some(provider_id), e.to_string()),
    }
  }

  info!(
    total = remote.len(),
    created = results.created,
    updated = results.updated,
    failed = results.errors.len(),
    "phone numbers synced"
  );
  Ok(Json(SyncResponse {
    success: true,
    message: format!("Synced {} phone numbers", remote.len()),
    results,
  }))
}
