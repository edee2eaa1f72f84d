//! Minimal `Cookie` / `Set-Cookie` handling for the two session cookies.

use axum::http::{HeaderMap, header::COOKIE};

use crate::session::SESSION_TTL_SECS;

pub const ADMIN_COOKIE: &str = "admin_session";

/// Name of the cookie holding the session for the page at `slug`.
pub fn demo_cookie(slug: &str) -> String { format!("demo_{slug}") }

/// Value of the first cookie called `name`, across all `Cookie` headers.
pub fn read<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.trim())
    .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value establishing a session.
pub fn session(name: &str, token: &str, secure: bool) -> String {
  build(name, token, SESSION_TTL_SECS, secure)
}

/// `Set-Cookie` value that removes `name`.
pub fn clear(name: &str, secure: bool) -> String { build(name, "", 0, secure) }

fn build(name: &str, value: &str, max_age: i64, secure: bool) -> String {
  let mut s = format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
  if secure {
    s.push_str("; Secure");
  }
  s
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  #[test]
  fn reads_named_cookie() {
    let mut h = HeaderMap::new();
    h.append(COOKIE, HeaderValue::from_static("a=1; demo_acme=tok ; b=2"));
    h.append(COOKIE, HeaderValue::from_static("admin_session=xyz"));

    assert_eq!(read(&h, "demo_acme"), Some("tok"));
    assert_eq!(read(&h, ADMIN_COOKIE), Some("xyz"));
    assert_eq!(read(&h, "demo_beta"), None);
  }

  #[test]
  fn cookie_attributes() {
    assert_eq!(
      session("demo_acme", "t", false),
      "demo_acme=t; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800"
    );
    assert!(session("admin_session", "t", true).ends_with("; Secure"));
    assert!(clear(ADMIN_COOKIE, false).contains("Max-Age=0"));
  }
}
