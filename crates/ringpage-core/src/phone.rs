//! Destination phone-number normalisation.

/// Strip formatting from a dialled number.
///
/// Keeps ASCII digits plus a single `+`, and only when it precedes every
/// digit. `"(555) 123-4567"` becomes `"5551234567"`; `"+1 555-123-4567"`
/// becomes `"+15551234567"`.
pub fn normalize_phone(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for c in input.chars() {
    match c {
      '0'..='9' => out.push(c),
      '+' if out.is_empty() => out.push(c),
      _ => {}
    }
  }
  out
}

/// `true` when the normalised number contains at least one digit.
pub fn has_digits(input: &str) -> bool {
  input.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_formatting() {
    assert_eq!(normalize_phone("(555) 123-4567"), "5551234567");
    assert_eq!(normalize_phone("+1 555-123-4567"), "+15551234567");
    assert_eq!(normalize_phone("555.123.4567 ext"), "5551234567");
  }

  #[test]
  fn only_a_leading_plus_survives() {
    assert_eq!(normalize_phone("  +44 20 7946 0958"), "+442079460958");
    assert_eq!(normalize_phone("1+2+3"), "123");
    assert_eq!(normalize_phone("++15"), "+15");
  }

  #[test]
  fn digit_detection() {
    assert!(has_digits("+1"));
    assert!(!has_digits("+"));
    assert!(!has_digits("call me"));
  }
}
