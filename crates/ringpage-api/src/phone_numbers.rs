//! Handlers for `/phone-numbers` endpoints: manual management of the local
//! phone-number mirror.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ringpage_core::{
  provider_entity::{NewPhoneNumber, PhoneNumber, PhoneNumberPatch},
  store::ConfigStore,
};
use ringpage_provider::CallProvider;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, bounded, error::ApiError, present};

const DUPLICATE: &str = "a phone number with this provider id already exists";

fn not_found() -> ApiError { ApiError::NotFound("phone number not found".into()) }

fn yes() -> bool { true }

/// Blank display numbers are stored as absent.
fn display_number(raw: Option<&str>) -> Result<Option<String>, ApiError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    None => Ok(None),
    Some(s) => bounded("displayNumber", s, 1, 30).map(Some),
  }
}

/// `GET /phone-numbers`
pub async fn list<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
) -> Result<Json<Vec<PhoneNumber>>, ApiError> {
  let all = state
    .store
    .list_phone_numbers()
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  Ok(Json(all))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub name:                     String,
  pub provider_phone_number_id: String,
  #[serde(default)]
  pub display_number:           Option<String>,
  #[serde(default = "yes")]
  pub is_active:                bool,
}

/// `POST /phone-numbers`
pub async fn create<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewPhoneNumber {
    name:                     bounded("name", &body.name, 2, 60)?,
    provider_phone_number_id: bounded(
      "providerPhoneNumberId",
      &body.provider_phone_number_id,
      2,
      120,
    )?,
    display_number:           display_number(body.display_number.as_deref())?,
    is_active:                body.is_active,
  };
  let created = state
    .store
    .create_phone_number(input)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /phone-numbers/{id}`
pub async fn get_one<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PhoneNumber>, ApiError> {
  state
    .store
    .get_phone_number(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .map(Json)
    .ok_or_else(not_found)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub name:                     Option<String>,
  pub provider_phone_number_id: Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub display_number:           Option<Option<String>>,
  pub is_active:                Option<bool>,
}

/// `PUT /phone-numbers/{id}`; `"displayNumber": null` clears the number.
pub async fn update<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<PhoneNumber>, ApiError> {
  let patch = PhoneNumberPatch {
    name:                     body.name.as_deref().map(|n| bounded("name", n, 2, 60)).transpose()?,
    provider_phone_number_id: body
      .provider_phone_number_id
      .as_deref()
      .map(|p| bounded("providerPhoneNumberId", p, 2, 120))
      .transpose()?,
    display_number:           body
      .display_number
      .map(|d| display_number(d.as_deref()))
      .transpose()?,
    is_active:                body.is_active,
  };
  state
    .store
    .update_phone_number(id, patch)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .map(Json)
    .ok_or_else(not_found)
}

/// `DELETE /phone-numbers/{id}`
pub async fn delete<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
  let removed = state
    .store
    .delete_phone_number(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  if !removed {
    return Err(not_found());
  }
  Ok(Json(json!({ "message": "Phone number deleted" })))
}
