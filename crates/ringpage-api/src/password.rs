//! argon2 hashing for admin and demo-page passwords.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::ApiError;

/// Hash `password` into a PHC string (`$argon2id$v=19$…`).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// `true` when `password` matches `phc`. A malformed hash never matches.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("open sesame").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("open sesame", &phc));
    assert!(!verify_password("open sesam", &phc));
    assert!(!verify_password("open sesame", "not-a-hash"));
  }
}
