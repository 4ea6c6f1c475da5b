//! `PetitionRecord` — one cleaned row of the source CSV.
//!
//! Every field is opaque text. No type coercion is attempted: a non-numeric
//! `year` is stored exactly as it was read.

use serde::{Deserialize, Serialize};

/// Columns that every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 11] = [
  "parcel_number",
  "archive",
  "petitioner",
  "defendant",
  "month",
  "year",
  "county",
  "state",
  "years_married",
  "reasoning",
  "result",
];

/// Columns that may be absent; a missing column reads as `None` on every row.
pub const OPTIONAL_COLUMNS: [&str; 4] = [
  "additional_requests",
  "enslaver_status",
  "enslaver_scope_estimate",
  "end_court",
];

/// A single petition row with headers and cells already trimmed.
///
/// Optional columns hold `None` both when the column is missing from the file
/// and when the cell is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetitionRecord {
  pub parcel_number:           String,
  pub archive:                 String,
  pub petitioner:              String,
  pub defendant:               String,
  pub month:                   String,
  pub year:                    String,
  pub county:                  String,
  pub state:                   String,
  pub years_married:           String,
  pub reasoning:               String,
  pub result:                  String,
  pub additional_requests:     Option<String>,
  pub enslaver_status:         Option<String>,
  pub enslaver_scope_estimate: Option<String>,
  pub end_court:               Option<String>,
}

/// The two People roles every petition carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Petitioner,
  Defendant,
}

impl Role {
  pub const ALL: [Role; 2] = [Role::Petitioner, Role::Defendant];
}

impl PetitionRecord {
  /// The name recorded for `role`, as read (possibly empty).
  pub fn name(&self, role: Role) -> &str {
    match role {
      Role::Petitioner => &self.petitioner,
      Role::Defendant => &self.defendant,
    }
  }
}

/// Map an already-trimmed cell to `None` when it is empty.
pub fn non_empty(cell: &str) -> Option<String> {
  (!cell.is_empty()).then(|| cell.to_owned())
}
