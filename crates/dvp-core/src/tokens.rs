//! Splitting of comma-joined cells.
//!
//! Reasoning, result, additional-request and multi-name People cells all pack
//! several values into one field separated by commas.

/// Split `cell` on commas, trimming each token and discarding empty ones.
pub fn split_list(cell: &str) -> impl Iterator<Item = &str> {
  cell.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// The stored form of a single `result` token.
///
/// `denied` (any case) is recorded as `rejected`; every other token is kept
/// verbatim.
pub fn normalize_result(token: &str) -> String {
  if token.eq_ignore_ascii_case("denied") {
    "rejected".to_owned()
  } else {
    token.to_owned()
  }
}
