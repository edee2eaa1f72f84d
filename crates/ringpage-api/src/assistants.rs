//! Handlers for `/assistants` endpoints: manual management of the local
//! assistant mirror. See [`crate::sync`] for the provider-driven path.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ringpage_core::{
  provider_entity::{Assistant, AssistantPatch, NewAssistant},
  store::ConfigStore,
};
use ringpage_provider::CallProvider;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, bounded, error::ApiError};

const DUPLICATE: &str = "an assistant with this provider id already exists";

fn not_found() -> ApiError { ApiError::NotFound("assistant not found".into()) }

fn yes() -> bool { true }

/// `GET /assistants`
pub async fn list<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
) -> Result<Json<Vec<Assistant>>, ApiError> {
  let all = state
    .store
    .list_assistants()
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  Ok(Json(all))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub name:                  String,
  pub provider_assistant_id: String,
  #[serde(default = "yes")]
  pub is_active:             bool,
}

/// `POST /assistants`
pub async fn create<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewAssistant {
    name:                  bounded("name", &body.name, 2, 60)?,
    provider_assistant_id: bounded("providerAssistantId", &body.provider_assistant_id, 2, 120)?,
    is_active:             body.is_active,
  };
  let created = state
    .store
    .create_assistant(input)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /assistants/{id}`
pub async fn get_one<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assistant>, ApiError> {
  state
    .store
    .get_assistant(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .map(Json)
    .ok_or_else(not_found)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub name:                  Option<String>,
  pub provider_assistant_id: Option<String>,
  pub is_active:             Option<bool>,
}

/// `PUT /assistants/{id}`
pub async fn update<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Assistant>, ApiError> {
  let patch = AssistantPatch {
    name:                  body.name.as_deref().map(|n| bounded("name", n, 2, 60)).transpose()?,
    provider_assistant_id: body
      .provider_assistant_id
      .as_deref()
      .map(|p| bounded("providerAssistantId", p, 2, 120))
      .transpose()?,
    is_active:             body.is_active,
  };
  state
    .store
    .update_assistant(id, patch)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .map(Json)
    .ok_or_else(not_found)
}

/// `DELETE /assistants/{id}`
pub async fn delete<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
  let removed = state
    .store
    .delete_assistant(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  if !removed {
    return Err(not_found());
  }
  Ok(Json(json!({ "message": "Assistant deleted" })))
}
