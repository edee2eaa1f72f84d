//! Slug normalisation.
//!
//! Turns whatever an administrator typed (or a browser percent-encoded) into
//! the canonical URL token under which a demo page is stored and looked up.

/// Canonicalise `input` into a URL-safe slug.
///
/// Percent-decodes when possible, lowercases, turns every run of characters
/// outside `[a-z0-9.-]` into a single hyphen, and trims hyphens from both
/// ends. The transform is lossy and idempotent; the result is either empty
/// or matches `^[a-z0-9]([a-z0-9.-]*[a-z0-9])?$`.
pub fn normalize_slug(input: &str) -> String {
  let raw = input.trim();
  if raw.is_empty() {
    return String::new();
  }

  let decoded = urlencoding::decode(raw)
    .map(|d| d.into_owned())
    .unwrap_or_else(|_| raw.to_string());

  let mut out = String::with_capacity(decoded.len());
  for c in decoded.trim().chars().flat_map(char::to_lowercase) {
    let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' {
      c
    } else {
      '-'
    };
    if c == '-' && (out.is_empty() || out.ends_with('-')) {
      continue;
    }
    out.push(c);
  }

  // Dots are trimmed along with hyphens: edges must be `[a-z0-9]`.
  out
    .trim_matches(|c: char| !c.is_ascii_alphanumeric())
    .to_string()
}
