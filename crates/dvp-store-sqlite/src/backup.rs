//! Timestamped copies of a store file.

use std::{
  ffi::OsString,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Local};

use crate::{Error, Result};

/// `<db>.bak.<YYYYmmdd_HHMMSS_micros>`; names sort in creation order.
pub fn backup_path(db: &Path, at: DateTime<Local>) -> PathBuf {
  let mut name = OsString::from(db.as_os_str());
  name.push(format!(".bak.{}", at.format("%Y%m%d_%H%M%S_%6f")));
  PathBuf::from(name)
}

/// Copy `db` to a fresh backup path and return it.
///
/// An existing file is never overwritten: on a name collision a `.N` suffix is
/// appended.
pub fn create_backup(db: &Path) -> Result<PathBuf> {
  let base = backup_path(db, Local::now());
  let mut target = base.clone();
  let mut n = 1;
  while target.exists() {
    let mut name = base.clone().into_os_string();
    name.push(format!(".{n}"));
    target = PathBuf::from(name);
    n += 1;
  }

  std::fs::copy(db, &target).map_err(Error::io("cannot back up to", &target))?;
  tracing::info!(backup = %target.display(), "backup created");
  Ok(target)
}
