//! Handlers for `/demo-pages` endpoints.
//!
//! | Method   | Path                           | Notes |
//! |----------|--------------------------------|-------|
//! | `GET`    | `/demo-pages`                  | Newest first |
//! | `POST`   | `/demo-pages`                  | 201; slug normalised |
//! | `GET`    | `/demo-pages/{id}`             | |
//! | `PUT`    | `/demo-pages/{id}`             | Partial at the top level |
//! | `DELETE` | `/demo-pages/{id}`             | |
//! | `POST`   | `/demo-pages/{id}/reset-calls` | Sets `callsMade` to 0 |
//!
//! Page responses never include the password hash; they expose
//! `hasPassword` instead.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ringpage_core::{
  demo_page::{DemoField, DemoPage, DemoPageDraft, Variable, validate_page_password},
  store::ConfigStore,
};
use ringpage_provider::CallProvider;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, password::hash_password, present};

const DUPLICATE: &str = "a demo page with this slug already exists";

fn not_found() -> ApiError { ApiError::NotFound("demo page not found".into()) }

fn yes() -> bool { true }

// ─── View ────────────────────────────────────────────────────────────────────

/// Admin projection of a page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoPageView {
  #[serde(flatten)]
  pub page:         DemoPage,
  pub has_password: bool,
}

impl From<DemoPage> for DemoPageView {
  fn from(page: DemoPage) -> Self {
    let has_password = page.password_hash.is_some();
    Self { page, has_password }
  }
}

// ─── maxCalls parsing ────────────────────────────────────────────────────────

/// Accepts a whole number, a numeric string, or `null` / `""` for unlimited.
fn max_calls<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
  let invalid = || <D::Error as de::Error>::custom("maxCalls must be a whole number or empty");
  match Option::<Value>::deserialize(d)? {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
    Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
    Some(_) => Err(invalid()),
  }
}

fn patch_max_calls<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<i64>>, D::Error> {
  max_calls(d).map(Some)
}

// ─── Shared save path ────────────────────────────────────────────────────────

/// Hash a newly supplied password, normalise, validate, and check that the
/// referenced credential, assistant and phone number exist.
async fn prepare<S: ConfigStore>(
  store: &S,
  mut draft: DemoPageDraft,
  password: Option<&str>,
) -> Result<DemoPageDraft, ApiError> {
  if draft.password_required
    && let Some(pw) = password.map(str::trim).filter(|p| !p.is_empty())
  {
    validate_page_password(pw)?;
    draft.password_hash = Some(hash_password(pw)?);
  }

  draft.normalize();
  draft.validate()?;

  let missing = |what: &str| ApiError::Validation(format!("{what} does not exist"));
  let store_err = |e| ApiError::store(e, DUPLICATE);

  if store.get_credential(draft.credential_id).await.map_err(store_err)?.is_none() {
    return Err(missing("credential"));
  }
  if store.get_assistant(draft.assistant_id).await.map_err(store_err)?.is_none() {
    return Err(missing("assistant"));
  }
  if store.get_phone_number(draft.phone_number_id).await.map_err(store_err)?.is_none() {
    return Err(missing("phone number"));
  }

  Ok(draft)
}

// ─── List / get ──────────────────────────────────────────────────────────────

/// `GET /demo-pages`
pub async fn list<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
) -> Result<Json<Vec<DemoPageView>>, ApiError> {
  let pages = state
    .store
    .list_demo_pages()
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  Ok(Json(pages.into_iter().map(DemoPageView::from).collect()))
}

/// `GET /demo-pages/{id}`
pub async fn get_one<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DemoPageView>, ApiError> {
  state
    .store
    .get_demo_page(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .map(|p| Json(p.into()))
    .ok_or_else(not_found)
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub slug:              String,
  #[serde(default)]
  pub title:             Option<String>,
  pub credential_id:     Uuid,
  pub assistant_id:      Uuid,
  pub phone_number_id:   Uuid,
  pub fields:            Vec<DemoField>,
  pub call_to_field_key: String,
  #[serde(default)]
  pub variables:         Vec<Variable>,
  #[serde(default)]
  pub password_required: bool,
  #[serde(default)]
  pub password:          Option<String>,
  #[serde(default, deserialize_with = "max_calls")]
  pub max_calls:         Option<i64>,
  #[serde(default = "yes")]
  pub is_active:         bool,
}

/// `POST /demo-pages`
pub async fn create<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let draft = DemoPageDraft {
    slug:              body.slug,
    title:             body.title,
    credential_id:     body.credential_id,
    assistant_id:      body.assistant_id,
    phone_number_id:   body.phone_number_id,
    fields:            body.fields,
    call_to_field_key: body.call_to_field_key,
    variables:         body.variables,
    password_required: body.password_required,
    password_hash:     None,
    max_calls:         body.max_calls,
    is_active:         body.is_active,
  };
  let draft = prepare(state.store.as_ref(), draft, body.password.as_deref()).await?;

  let page = state
    .store
    .create_demo_page(draft)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  tracing::info!(slug = %page.slug, id = %page.id, "demo page created");
  Ok((StatusCode::CREATED, Json(DemoPageView::from(page))))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Absent keys keep the stored value. `fields` and `variables` replace the
/// stored lists wholesale.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub slug:              Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub title:             Option<Option<String>>,
  pub credential_id:     Option<Uuid>,
  pub assistant_id:      Option<Uuid>,
  pub phone_number_id:   Option<Uuid>,
  pub fields:            Option<Vec<DemoField>>,
  pub call_to_field_key: Option<String>,
  pub variables:         Option<Vec<Variable>>,
  pub password_required: Option<bool>,
  pub password:          Option<String>,
  #[serde(default, deserialize_with = "patch_max_calls")]
  pub max_calls:         Option<Option<i64>>,
  pub is_active:         Option<bool>,
}

/// `PUT /demo-pages/{id}`
pub async fn update<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<DemoPageView>, ApiError> {
  let existing = state
    .store
    .get_demo_page(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .ok_or_else(not_found)?;

  let mut draft = existing.to_draft();
  if let Some(v) = body.slug { draft.slug = v; }
  if let Some(v) = body.title { draft.title = v; }
  if let Some(v) = body.credential_id { draft.credential_id = v; }
  if let Some(v) = body.assistant_id { draft.assistant_id = v; }
  if let Some(v) = body.phone_number_id { draft.phone_number_id = v; }
  if let Some(v) = body.fields { draft.fields = v; }
  if let Some(v) = body.call_to_field_key { draft.call_to_field_key = v; }
  if let Some(v) = body.variables { draft.variables = v; }
  if let Some(v) = body.password_required { draft.password_required = v; }
  if let Some(v) = body.max_calls { draft.max_calls = v; }
  if let Some(v) = body.is_active { draft.is_active = v; }

  let draft = prepare(state.store.as_ref(), draft, body.password.as_deref()).await?;

  state
    .store
    .update_demo_page(id, draft)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .map(|p| Json(p.into()))
    .ok_or_else(not_found)
}

// ─── Delete / reset ──────────────────────────────────────────────────────────

/// `DELETE /demo-pages/{id}`
pub async fn delete<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
  let removed = state
    .store
    .delete_demo_page(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?;
  if !removed {
    return Err(not_found());
  }
  Ok(Json(json!({ "message": "Demo page deleted" })))
}

/// `POST /demo-pages/{id}/reset-calls`
pub async fn reset_calls<S: ConfigStore, P: CallProvider>(
  State(state): State<ApiState<S, P>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
  let page = state
    .store
    .reset_calls_made(id)
    .await
    .map_err(|e| ApiError::store(e, DUPLICATE))?
    .ok_or_else(not_found)?;
  tracing::info!(slug = %page.slug, "call counter reset");
  Ok(Json(json!({
    "success":   true,
    "message":   "Call counter reset",
    "callsMade": page.calls_made,
  })))
}
