//! Handlers for `/credentials` endpoints.
//!
//! | Method   | Path                | Notes |
//! |----------|---------------------|-------|
//! | `GET`    | `/credentials`      | Newest first |
//! | `POST`   | `/credentials`      | Body: `{"name":"prod","value":"sk_…"}` |
//! | `GET`    | `/credentials/{id}` | 404 if not found |
//! | `PUT`    | `/credentials/{id}` | Partial: `name`, `value`, `isActive` |
//! | `DELETE` | `/credentials/{id}` | |
//!
//! Responses carry a masked value, never the secret.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ringpage_core::{
  credential::{CredentialPatch, CredentialSummary, NewCredential},
  store::ConfigStore,
};
use ringpage_provider::CallProvider;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, bounded, error::ApiError};

const DUPLICATE: &str = "a credential with this name already exists";

fn not_found() -> ApiError { ApiError::NotFound("credential not found".into()) }

/// `GET /credentials`
pub async fn list<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
) -> Result<Json<Vec<CredentialSummary>>, ApiError> {
  let all = state
    .store
    .list_credentials()
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  Ok(Json(all.iter().map(CredentialSummary::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:  String,
  pub value: String,
}

/// `POST /credentials`
pub async fn create<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewCredential {
    name:         bounded("name", &body.name, 2, 60)?,
    secret_value: bounded("value", &body.value, 6, 500)?,
  };
  let created = state
    .store
    .create_credential(input)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  Ok((StatusCode::CREATED, Json(CredentialSummary::from(&created))))
}

/// `GET /credentials/{id}`
pub async fn get_one<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CredentialSummary>, ApiError> {
  let c = state
    .store
    .get_credential(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .ok_or_else(not_found)?;
  Ok(Json(CredentialSummary::from(&c)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub name:      Option<String>,
  pub value:     Option<String>,
  pub is_active: Option<bool>,
}

/// `PUT /credentials/{id}`
pub async fn update<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<CredentialSummary>, ApiError> {
  let patch = CredentialPatch {
    name:         body.name.as_deref().map(|n| bounded("name", n, 2, 60)).transpose()?,
    secret_value: body.value.as_deref().map(|v| bounded("value", v, 6, 500)).transpose()?,
    is_active:    body.is_active,
  };
  let c = state
    .store
    .update_credential(id, patch)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .ok_or_else(not_found)?;
  Ok(Json(CredentialSummary::from(&c)))
}

/// `DELETE /credentials/{id}`
pub async fn delete<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
  let removed = state
    .store
    .delete_credential(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  if !removed {
    return Err(not_found());
  }
  Ok(Json(json!({ "message": "Credential deleted" })))
}
