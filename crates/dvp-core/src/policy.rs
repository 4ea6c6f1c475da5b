//! Named resolution policies for ambiguous source data.
//!
//! Neither policy raises an error. Each picks one deterministic answer and, in
//! the parcel case, reports what it overrode so the caller can log it.

use std::collections::HashMap;

use serde::Serialize;

use crate::tokens::split_list;

// ─── Parcel index ────────────────────────────────────────────────────────────

/// A parcel number seen on more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateParcel {
  pub parcel_number: String,
  /// The petition id the index pointed at before this row replaced it.
  pub replaced:      i64,
  /// The petition id the index points at now.
  pub winner:        i64,
}

/// Parcel number → petition id, **last writer wins**.
///
/// Petition ids themselves follow row order, so on a repeated parcel number
/// the index resolves to the last of those rows while each row still keeps
/// its own petition id.
#[derive(Debug, Clone, Default)]
pub struct ParcelIndex {
  ids:        HashMap<String, i64>,
  duplicates: Vec<DuplicateParcel>,
}

impl ParcelIndex {
  pub fn insert(&mut self, parcel_number: &str, petition_id: i64) {
    if let Some(replaced) = self.ids.insert(parcel_number.to_owned(), petition_id) {
      self.duplicates.push(DuplicateParcel {
        parcel_number: parcel_number.to_owned(),
        replaced,
        winner: petition_id,
      });
    }
  }

  pub fn get(&self, parcel_number: &str) -> Option<i64> {
    self.ids.get(parcel_number).copied()
  }

  /// Every replacement, in the order rows were read.
  pub fn duplicates(&self) -> &[DuplicateParcel] { &self.duplicates }
}

// ─── Additional requests ─────────────────────────────────────────────────────

/// Resolve a petition's single `additional_requests_id`, **first match wins**.
///
/// `cell` is the petition's raw comma-joined field and `ids` maps lowercase
/// request tokens to their stored ids. A petition references at most one
/// request even when its field lists several.
pub fn resolve_additional_request(
  cell: Option<&str>,
  ids: &HashMap<String, i64>,
) -> Option<i64> {
  split_list(cell?)
    .map(str::to_lowercase)
    .find_map(|token| ids.get(&token).copied())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parcel_index_last_writer_wins() {
    let mut index = ParcelIndex::default();
    index.insert("P1", 1);
    index.insert("P2", 2);
    index.insert("P1", 3);

    assert_eq!(index.get("P1"), Some(3));
    assert_eq!(index.get("P2"), Some(2));
    assert_eq!(index.get("P3"), None);
    assert_eq!(index.duplicates(), &[DuplicateParcel {
      parcel_number: "P1".into(),
      replaced:      1,
      winner:        3,
    }]);
  }

  #[test]
  fn additional_request_first_match_wins() {
    let ids: HashMap<String, i64> =
      [("alimony".to_owned(), 7), ("custody".to_owned(), 4)].into();

    assert_eq!(resolve_additional_request(Some("Alimony, custody"), &ids), Some(7));
    assert_eq!(resolve_additional_request(Some("custody, alimony"), &ids), Some(4));
  }

  #[test]
  fn additional_request_skips_unknown_tokens() {
    let ids: HashMap<String, i64> = [("custody".to_owned(), 4)].into();
    assert_eq!(resolve_additional_request(Some("dower, custody"), &ids), Some(4));
    assert_eq!(resolve_additional_request(Some("dower"), &ids), None);
    assert_eq!(resolve_additional_request(None, &ids), None);
  }
}
