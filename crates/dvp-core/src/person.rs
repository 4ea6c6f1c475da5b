//! The People identity triple.

use serde::{Deserialize, Serialize};

use crate::record::{PetitionRecord, Role};

/// Identity of a People row: `(name, enslaver_status, enslaver_scope_estimate)`.
///
/// Two people with the same name but different status or scope are distinct.
/// Status and scope are optional; an absent value is a first-class part of the
/// key and matches only another absent value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonKey {
  pub name:                    String,
  pub enslaver_status:         Option<String>,
  pub enslaver_scope_estimate: Option<String>,
}

impl PersonKey {
  pub fn new(
    name: impl Into<String>,
    enslaver_status: Option<String>,
    enslaver_scope_estimate: Option<String>,
  ) -> Self {
    Self {
      name: name.into(),
      enslaver_status,
      enslaver_scope_estimate,
    }
  }

  /// A key with no status or scope.
  pub fn bare(name: impl Into<String>) -> Self { Self::new(name, None, None) }

  /// The key for `role` on `record`, or `None` when that name is empty.
  ///
  /// Status and scope describe the row, so both roles share them.
  pub fn for_role(record: &PetitionRecord, role: Role) -> Option<Self> {
    let name = record.name(role);
    if name.is_empty() {
      return None;
    }
    Some(Self::new(
      name,
      record.enslaver_status.clone(),
      record.enslaver_scope_estimate.clone(),
    ))
  }
}
