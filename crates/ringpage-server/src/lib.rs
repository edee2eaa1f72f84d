//! HTTP surface for ringpage: visitor demo pages, admin login, and the
//! session guard in front of the admin API.
//!
//! Exposes [`router`], backed by any [`ConfigStore`] and [`CallProvider`].

pub mod admin_auth;
pub mod cookie;
pub mod dispatch;
pub mod guard;
pub mod session;
pub mod visitor;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use ringpage_core::store::ConfigStore;
use ringpage_provider::{CallProvider, DEFAULT_BASE_URL};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use session::SessionKeys;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `RINGPAGE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  pub store_path:            PathBuf,
  pub admin_username:        String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub admin_password_hash:   String,
  pub admin_session_secret:  String,
  pub demo_session_secret:   String,
  #[serde(default = "default_provider_base_url")]
  pub provider_base_url:     String,
  #[serde(default = "default_provider_timeout_secs")]
  pub provider_timeout_secs: u64,
  /// Add `Secure` to session cookies.
  #[serde(default)]
  pub secure_cookies:        bool,
  /// Log every dispatched call request and response (secrets redacted).
  #[serde(default)]
  pub debug_calls:           bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_provider_base_url() -> String { DEFAULT_BASE_URL.to_string() }

fn default_provider_timeout_secs() -> u64 { 30 }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub store:    Arc<S>,
  pub provider: Arc<P>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionKeys>,
}

impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      provider: self.provider.clone(),
      config:   self.config.clone(),
      sessions: self.sessions.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the complete application router.
///
/// Every request passes through [`guard::require_admin`], which only acts on
/// admin paths.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: ConfigStore + 'static,
  P: CallProvider + 'static,
{
  let admin_api = ringpage_api::admin_router(state.store.clone(), state.provider.clone());

  let own = Router::new()
    // Visitor
    .route("/demo-config/{slug}", get(visitor::page_config::<S, P>))
    .route(
      "/demo-config/{slug}/verify-password",
      post(visitor::verify_password::<S, P>),
    )
    .route("/demo-config/{slug}/call", post(visitor::call::<S, P>))
    // Admin session
    .route("/admin/login", get(admin_auth::login_page))
    .route("/api/admin/login", post(admin_auth::login::<S, P>))
    .route("/api/admin/logout", post(admin_auth::logout::<S, P>))
    .route("/api/admin/session", get(admin_auth::session))
    .with_state(state.clone());

  own
    .nest("/api/admin", admin_api)
    .layer(middleware::from_fn_with_state(state, guard::require_admin::<S, P>))
    .layer(TraceLayer::new_for_http())
}
