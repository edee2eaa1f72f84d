//! Signed session tokens.
//!
//! Two independent HS256 token spaces: admin sessions carry a username,
//! demo-page sessions carry the slug they unlock. Each space has its own
//! secret and audience, so a token from one never validates in the other.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of both session kinds.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

const ADMIN_AUDIENCE: &str = "ringpage-admin";
const DEMO_AUDIENCE: &str = "ringpage-demo";

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("{0} session secret must not be empty")]
  EmptySecret(&'static str),

  #[error("admin and demo session secrets must differ")]
  SharedSecret,

  #[error("token signing failed: {0}")]
  Sign(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
  pub username: String,
  pub aud:      String,
  pub iat:      i64,
  pub exp:      i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoClaims {
  pub slug: String,
  pub aud:  String,
  pub iat:  i64,
  pub exp:  i64,
}

#[derive(Clone)]
struct Keys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl Keys {
  fn new(secret: &str, audience: &str) -> Self {
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);
    validation.set_required_spec_claims(&["exp", "aud"]);
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
    }
  }
}

/// Signer/verifier for both session kinds.
#[derive(Clone)]
pub struct SessionKeys {
  admin: Keys,
  demo:  Keys,
}

impl SessionKeys {
  /// Both secrets must be non-empty and distinct.
  pub fn new(admin_secret: &str, demo_secret: &str) -> Result<Self, SessionError> {
    if admin_secret.is_empty() {
      return Err(SessionError::EmptySecret("admin"));
    }
    if demo_secret.is_empty() {
      return Err(SessionError::EmptySecret("demo"));
    }
    if admin_secret == demo_secret {
      return Err(SessionError::SharedSecret);
    }
    Ok(Self {
      admin: Keys::new(admin_secret, ADMIN_AUDIENCE),
      demo:  Keys::new(demo_secret, DEMO_AUDIENCE),
    })
  }

  pub fn issue_admin(&self, username: &str) -> Result<String, SessionError> {
    let iat = Utc::now().timestamp();
    let claims = AdminClaims {
      username: username.to_string(),
      aud:      ADMIN_AUDIENCE.to_string(),
      iat,
      exp:      iat + SESSION_TTL_SECS,
    };
    Ok(encode(&Header::default(), &claims, &self.admin.encoding)?)
  }

  /// Claims of a valid, unexpired admin token.
  pub fn verify_admin(&self, token: &str) -> Option<AdminClaims> {
    decode::<AdminClaims>(token, &self.admin.decoding, &self.admin.validation)
      .ok()
      .map(|d| d.claims)
  }

  pub fn issue_demo(&self, slug: &str) -> Result<String, SessionError> {
    let iat = Utc::now().timestamp();
    let claims = DemoClaims {
      slug: slug.to_string(),
      aud:  DEMO_AUDIENCE.to_string(),
      iat,
      exp:  iat + SESSION_TTL_SECS,
    };
    Ok(encode(&Header::default(), &claims, &self.demo.encoding)?)
  }

  /// `true` when `token` is a valid, unexpired demo session for `slug`.
  pub fn verify_demo(&self, token: &str, slug: &str) -> bool {
    decode::<DemoClaims>(token, &self.demo.decoding, &self.demo.validation)
      .is_ok_and(|d| d.claims.slug == slug)
  }
}
