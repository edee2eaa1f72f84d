//! Visitor-facing demo-page endpoints.
//!
//! | Method | Path                                 | Notes |
//! |--------|--------------------------------------|-------|
//! | `GET`  | `/demo-config/{slug}`                | Public projection; 401 if locked |
//! | `POST` | `/demo-config/{slug}/verify-password`| Sets `demo_{slug}` cookie |
//! | `POST` | `/demo-config/{slug}/call`           | Body: the form values |

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, header::SET_COOKIE},
  response::IntoResponse,
};
use ringpage_api::{ApiError, password::verify_password as password_matches};
use ringpage_core::{
  demo_page::{DemoPage, PublicDemoPage},
  form::FormData,
  slug::normalize_slug,
  store::ConfigStore,
};
use ringpage_provider::CallProvider;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{
  AppState, cookie,
  dispatch::{CallOutcome, dispatch_call},
};

// ─── Resolver ────────────────────────────────────────────────────────────────

/// The active page for a raw slug from the URL.
async fn active_page<S: ConfigStore, P: CallProvider>(
  state: &AppState<S, P>,
  raw_slug: &str,
) -> Result<DemoPage, ApiError> {
  let slug = normalize_slug(raw_slug);
  if slug.is_empty() {
    return Err(ApiError::NotFound("Demo page not found".into()));
  }
  state
    .store
    .find_active_demo_page(&slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("Demo page not found".into()))
}

/// `true` when `headers` carry a valid session for `page`.
fn has_session<S, P>(state: &AppState<S, P>, headers: &HeaderMap, page: &DemoPage) -> bool {
  cookie::read(headers, &cookie::demo_cookie(&page.slug))
    .is_some_and(|token| state.sessions.verify_demo(token, &page.slug))
}

/// `GET /demo-config/{slug}`
pub async fn page_config<S: ConfigStore, P: CallProvider>(
  State(state): State<AppState<S, P>>,
  Path(slug): Path<String>,
  headers: HeaderMap,
) -> Result<Json<PublicDemoPage>, ApiError> {
  let page = active_page(&state, &slug).await?;
  if page.password_required && !has_session(&state, &headers, &page) {
    return Err(ApiError::PasswordRequired);
  }
  Ok(Json(page.public_view()))
}

// ─── Password ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  #[serde(default)]
  pub password: String,
}

/// `POST /demo-config/{slug}/verify-password`
pub async fn verify_password<S: ConfigStore, P: CallProvider>(
  State(state): State<AppState<S, P>>,
  Path(slug): Path<String>,
  Json(body): Json<VerifyBody>,
) -> Result<impl IntoResponse, ApiError> {
  let page = active_page(&state, &slug).await?;
  if !page.password_required {
    return Err(ApiError::Validation("This demo page does not require a password".into()));
  }
  let Some(hash) = page.password_hash.as_deref() else {
    return Err(ApiError::Configuration("Password protection is not configured".into()));
  };
  if !password_matches(&body.password, hash) {
    warn!(slug = %page.slug, "wrong demo password");
    return Err(ApiError::Unauthorized("Invalid password".into()));
  }

  let token = state
    .sessions
    .issue_demo(&page.slug)
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  let set_cookie = cookie::session(
    &cookie::demo_cookie(&page.slug),
    &token,
    state.config.secure_cookies,
  );
  Ok(([(SET_COOKIE, set_cookie)], Json(json!({ "success": true }))))
}

// ─── Call ────────────────────────────────────────────────────────────────────

/// `POST /demo-config/{slug}/call`
pub async fn call<S: ConfigStore, P: CallProvider>(
  State(state): State<AppState<S, P>>,
  Path(slug): Path<String>,
  headers: HeaderMap,
  Json(form): Json<FormData>,
) -> Result<Json<CallOutcome>, ApiError> {
  let page = active_page(&state, &slug).await?;
  let session_valid = has_session(&state, &headers, &page);
  let outcome = dispatch_call(
    state.store.as_ref(),
    state.provider.as_ref(),
    &page,
    session_valid,
    &form,
    state.config.debug_calls,
  )
  .await?;
  Ok(Json(outcome))
}
