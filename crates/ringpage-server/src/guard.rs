//! Admin access guard.
//!
//! Applied to the whole router; acts on `/admin*` and `/api/admin*` except
//! the two login paths. A request without a valid `admin_session` cookie is
//! redirected to the login page with `next` set to the requested path; an
//! invalid cookie is cleared on the way.

use axum::{
  extract::{Request, State},
  http::header::SET_COOKIE,
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use ringpage_core::store::ConfigStore;
use ringpage_provider::CallProvider;

use crate::{AppState, cookie};

/// Identity of the administrator behind a request, inserted into request
/// extensions by [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub username: String,
}

/// `true` for paths that need an admin session.
pub fn is_guarded(path: &str) -> bool {
  let admin = path == "/admin" || path.starts_with("/admin/");
  let api = path == "/api/admin" || path.starts_with("/api/admin/");
  (admin || api) && path != "/admin/login" && path != "/api/admin/login"
}

/// Where an unauthenticated request for `path` is sent.
pub fn login_redirect(path: &str) -> String {
  format!("/admin/login?next={}", urlencoding::encode(path))
}

pub async fn require_admin<S, P>(
  State(state): State<AppState<S, P>>,
  mut req: Request,
  next: Next,
) -> Response
where
  S: ConfigStore + 'static,
  P: CallProvider + 'static,
{
  let path = req.uri().path().to_string();
  if !is_guarded(&path) {
    return next.run(req).await;
  }

  let Some(token) = cookie::read(req.headers(), cookie::ADMIN_COOKIE) else {
    return Redirect::to(&login_redirect(&path)).into_response();
  };

  match state.sessions.verify_admin(token) {
    Some(claims) => {
      req
        .extensions_mut()
        .insert(AdminSession { username: claims.username });
      next.run(req).await
    }
    None => {
      tracing::debug!(%path, "rejecting invalid admin session");
      (
        [(SET_COOKIE, cookie::clear(cookie::ADMIN_COOKIE, state.config.secure_cookies))],
        Redirect::to(&login_redirect(&path)),
      )
        .into_response()
    }
  }
}
