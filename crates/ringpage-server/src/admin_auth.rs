//! Admin login, logout and session introspection.

use axum::{
  Extension, Json,
  extract::{Query, State},
  http::header::SET_COOKIE,
  response::IntoResponse,
};
use ringpage_api::{ApiError, password::verify_password};
use ringpage_core::store::ConfigStore;
use ringpage_provider::CallProvider;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{AppState, cookie, guard::AdminSession};

#[derive(Debug, Deserialize)]
pub struct LoginPageParams {
  pub next: Option<String>,
}

/// Only same-site absolute paths are honoured as a post-login target.
fn safe_next(next: Option<&str>) -> &str {
  match next {
    Some(n) if n.starts_with('/') && !n.starts_with("//") => n,
    _ => "/admin",
  }
}

/// `GET /admin/login[?next=…]`: tells the client where to post credentials
/// and where to go afterwards.
pub async fn login_page(Query(params): Query<LoginPageParams>) -> Json<Value> {
  Json(json!({
    "loginEndpoint": "/api/admin/login",
    "next":          safe_next(params.next.as_deref()),
  }))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /api/admin/login`
pub async fn login<S: ConfigStore, P: CallProvider>(
  State(state): State<AppState<S, P>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
  let config = &state.config;
  let ok = body.username == config.admin_username
    && verify_password(&body.password, &config.admin_password_hash);
  if !ok {
    warn!(username = %body.username, "admin login failed");
    return Err(ApiError::Unauthorized("Invalid credentials".into()));
  }

  let token = state
    .sessions
    .issue_admin(&body.username)
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  info!(username = %body.username, "admin logged in");

  Ok((
    [(SET_COOKIE, cookie::session(cookie::ADMIN_COOKIE, &token, config.secure_cookies))],
    Json(json!({ "success": true })),
  ))
}

/// `POST /api/admin/logout`
pub async fn logout<S: ConfigStore, P: CallProvider>(
  State(state): State<AppState<S, P>>,
) -> impl IntoResponse {
  (
    [(SET_COOKIE, cookie::clear(cookie::ADMIN_COOKIE, state.config.secure_cookies))],
    Json(json!({ "success": true })),
  )
}

/// `GET /api/admin/session`
pub async fn session(Extension(admin): Extension<AdminSession>) -> Json<Value> {
  Json(json!({ "username": admin.username }))
}
