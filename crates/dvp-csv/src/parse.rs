//! Header resolution and row decoding.
//!
//! Pipeline:
//!   header row
//!     └─ Columns::from_headers()  → column positions (or MissingColumns)
//!          └─ Columns::decode()   → PetitionRecord per data row

use csv::StringRecord;
use dvp_core::record::{
  OPTIONAL_COLUMNS, PetitionRecord, REQUIRED_COLUMNS, non_empty,
};

use crate::error::{Error, Result};

/// Positions of each known column within a row.
pub(crate) struct Columns {
  required: [usize; REQUIRED_COLUMNS.len()],
  optional: [Option<usize>; OPTIONAL_COLUMNS.len()],
}

fn clean_header(raw: &str) -> &str { raw.trim_start_matches('\u{feff}').trim() }

impl Columns {
  /// Resolve column positions from the (untrimmed) header row.
  ///
  /// When a header name repeats, the first occurrence is used.
  pub(crate) fn from_headers(headers: &StringRecord) -> Result<Self> {
    let position = |name: &str| headers.iter().position(|h| clean_header(h) == name);

    let mut required = [0; REQUIRED_COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
      match position(name) {
        Some(idx) => *slot = idx,
        None => missing.push(name.to_owned()),
      }
    }
    if !missing.is_empty() {
      return Err(Error::MissingColumns(missing));
    }

    let optional = OPTIONAL_COLUMNS.map(position);
    for (name, idx) in OPTIONAL_COLUMNS.iter().zip(&optional) {
      if idx.is_none() {
        tracing::debug!(column = *name, "optional column absent");
      }
    }

    Ok(Self { required, optional })
  }

  /// Decode one data row. Short rows read their missing cells as empty.
  pub(crate) fn decode(&self, row: &StringRecord) -> PetitionRecord {
    let cell = |idx: usize| row.get(idx).unwrap_or("").trim();
    let req = |i: usize| cell(self.required[i]).to_owned();
    let opt = |i: usize| self.optional[i].and_then(|idx| non_empty(cell(idx)));

    PetitionRecord {
      parcel_number:           req(0),
      archive:                 req(1),
      petitioner:              req(2),
      defendant:               req(3),
      month:                   req(4),
      year:                    req(5),
      county:                  req(6),
      state:                   req(7),
      years_married:           req(8),
      reasoning:               req(9),
      result:                  req(10),
      additional_requests:     opt(0),
      enslaver_status:         opt(1),
      enslaver_scope_estimate: opt(2),
      end_court:               opt(3),
    }
  }
}
