//! In-place migration that splits multi-name `People` rows.
//!
//! A People row whose name packs several comma-joined individuals is replaced
//! by one row per individual. Only the first individual keeps the original
//! status and scope; later ones get NULL for both. Links from petitions to the
//! original row are moved to every replacement row.
//!
//! The migration is idempotent: replacement rows are looked up by their full
//! identity before being created, and rows without a comma are never touched.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use dvp_core::{PersonKey, tokens::split_list};
use rusqlite::{Connection, OpenFlags, Transaction, params};
use serde::Serialize;

use crate::{Error, Result, backup::create_backup, people};

/// Counts observed by one migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
  pub backup:               PathBuf,
  pub people_before:        usize,
  pub links_before:         usize,
  pub people_after:         usize,
  pub links_after:          usize,
  /// Multi-name rows replaced and deleted.
  pub rows_split:           usize,
  /// Replacement rows that did not already exist.
  pub people_created:       usize,
  /// People names still containing a comma after the run.
  pub remaining_multi_name: usize,
}

/// Split every multi-name People row of the store at `db`.
///
/// Fails with [`Error::StoreNotFound`] before any backup when `db` does not
/// exist. Otherwise a timestamped backup is taken first and all changes are
/// made in one transaction, so a failure leaves the store as it was.
pub fn split_people(db: impl AsRef<Path>) -> Result<MigrationReport> {
  let db = db.as_ref();
  if !db.is_file() {
    return Err(Error::StoreNotFound(db.to_owned()));
  }

  let backup = create_backup(db)?;

  let mut conn = Connection::open_with_flags(
    db,
    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
  )?;
  let tx = conn.transaction()?;
  let mut report = migrate(&tx, backup)?;
  report.remaining_multi_name = count(&tx, "SELECT COUNT(*) FROM People WHERE name LIKE '%,%'")?;
  tx.commit()?;

  tracing::info!(
    backup = %report.backup.display(),
    people_before = report.people_before,
    people_after = report.people_after,
    links_before = report.links_before,
    links_after = report.links_after,
    rows_split = report.rows_split,
    remaining_multi_name = report.remaining_multi_name,
    "people migration complete"
  );
  Ok(report)
}

fn migrate(tx: &Transaction<'_>, backup: PathBuf) -> Result<MigrationReport> {
  let people_before = count(tx, "SELECT COUNT(*) FROM People")?;
  let links_before = count(tx, "SELECT COUNT(*) FROM Petition_People_Lookup")?;

  let rows = people::all(tx)?;
  let links = all_links(tx)?;

  // Original id → replacement ids, for multi-name rows only. Every other row
  // maps to itself and needs no new links.
  let mut replaced: HashMap<i64, Vec<i64>> = HashMap::new();
  let mut people_created = 0;

  for row in &rows {
    let Some(name) = row.name.as_deref().filter(|n| n.contains(',')) else {
      continue;
    };

    let mut ids = Vec::new();
    for (i, part) in split_list(name).enumerate() {
      let key = if i == 0 {
        PersonKey::new(
          part,
          row.enslaver_status.clone(),
          row.enslaver_scope_estimate.clone(),
        )
      } else {
        PersonKey::bare(part)
      };
      let (id, created) = people::find_or_insert(tx, &key)?;
      if created {
        people_created += 1;
      }
      ids.push(id);
    }

    if ids.is_empty() {
      tracing::warn!(person_id = row.person_id, name, "multi-name row holds no names; its links are dropped");
    }
    replaced.insert(row.person_id, ids);
  }

  for (petition_id, person_id) in &links {
    if let Some(ids) = replaced.get(person_id) {
      for &id in ids {
        people::link(tx, *petition_id, id)?;
      }
    }
  }

  let mut delete_links = tx.prepare("DELETE FROM Petition_People_Lookup WHERE person_id = ?1")?;
  let mut delete_person = tx.prepare("DELETE FROM People WHERE person_id = ?1")?;
  for person_id in replaced.keys() {
    delete_links.execute(params![person_id])?;
    delete_person.execute(params![person_id])?;
  }

  Ok(MigrationReport {
    backup,
    people_before,
    links_before,
    people_after: count(tx, "SELECT COUNT(*) FROM People")?,
    links_after: count(tx, "SELECT COUNT(*) FROM Petition_People_Lookup")?,
    rows_split: replaced.len(),
    people_created,
    remaining_multi_name: 0,
  })
}

/// Every `(petition_id, person_id)` link, in storage order.
fn all_links(conn: &Connection) -> Result<Vec<(i64, i64)>> {
  let mut stmt = conn.prepare("SELECT petition_id, person_id FROM Petition_People_Lookup")?;
  let links = stmt
    .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(links)
}

fn count(conn: &Connection, sql: &str) -> Result<usize> {
  let n: i64 = conn.query_row(sql, [], |r| r.get(0))?;
  Ok(n as usize)
}
