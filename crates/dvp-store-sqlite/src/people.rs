//! NULL-aware identity lookup for `People`.
//!
//! `=` never matches NULL in SQL, so each of status and scope selects either an
//! equality or an `IS NULL` predicate depending on whether the key carries a
//! value. The same helpers back both the loader and the migration.

use std::collections::HashMap;

use dvp_core::PersonKey;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::Result;

const BY_STATUS_AND_SCOPE: &str = "SELECT person_id FROM People
   WHERE name = ?1 AND enslaver_status = ?2 AND enslaver_scope_estimate = ?3
   ORDER BY person_id LIMIT 1";

const BY_STATUS_ONLY: &str = "SELECT person_id FROM People
   WHERE name = ?1 AND enslaver_status = ?2 AND enslaver_scope_estimate IS NULL
   ORDER BY person_id LIMIT 1";

const BY_SCOPE_ONLY: &str = "SELECT person_id FROM People
   WHERE name = ?1 AND enslaver_status IS NULL AND enslaver_scope_estimate = ?2
   ORDER BY person_id LIMIT 1";

const BY_NAME_ONLY: &str = "SELECT person_id FROM People
   WHERE name = ?1 AND enslaver_status IS NULL AND enslaver_scope_estimate IS NULL
   ORDER BY person_id LIMIT 1";

/// The id of the People row whose triple equals `key`, if any.
pub(crate) fn find(conn: &Connection, key: &PersonKey) -> Result<Option<i64>> {
  let name = &key.name;
  let id: Option<i64> = match (&key.enslaver_status, &key.enslaver_scope_estimate) {
    (Some(status), Some(scope)) => conn
      .prepare_cached(BY_STATUS_AND_SCOPE)?
      .query_row(params![name, status, scope], |r| r.get(0)),
    (Some(status), None) => conn
      .prepare_cached(BY_STATUS_ONLY)?
      .query_row(params![name, status], |r| r.get(0)),
    (None, Some(scope)) => conn
      .prepare_cached(BY_SCOPE_ONLY)?
      .query_row(params![name, scope], |r| r.get(0)),
    (None, None) => conn
      .prepare_cached(BY_NAME_ONLY)?
      .query_row(params![name], |r| r.get(0)),
  }
  .optional()?;
  Ok(id)
}

/// Return the id of `key`, inserting a new People row when none matches.
///
/// The boolean is `true` when a row was created.
pub(crate) fn find_or_insert(conn: &Connection, key: &PersonKey) -> Result<(i64, bool)> {
  if let Some(id) = find(conn, key)? {
    return Ok((id, false));
  }
  conn
    .prepare_cached(
      "INSERT INTO People (name, enslaver_status, enslaver_scope_estimate)
       VALUES (?1, ?2, ?3)",
    )?
    .execute(params![key.name, key.enslaver_status, key.enslaver_scope_estimate])?;
  Ok((conn.last_insert_rowid(), true))
}

/// A raw `People` row. `name` is nullable in the schema.
pub(crate) struct PersonRow {
  pub person_id:               i64,
  pub name:                    Option<String>,
  pub enslaver_status:         Option<String>,
  pub enslaver_scope_estimate: Option<String>,
}

/// Every People row in id order.
pub(crate) fn all(conn: &Connection) -> Result<Vec<PersonRow>> {
  let mut stmt = conn.prepare(
    "SELECT person_id, name, enslaver_status, enslaver_scope_estimate
       FROM People ORDER BY person_id",
  )?;
  let rows = stmt
    .query_map([], |r| {
      Ok(PersonRow {
        person_id:               r.get(0)?,
        name:                    r.get(1)?,
        enslaver_status:         r.get(2)?,
        enslaver_scope_estimate: r.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Identity triple → storage id for every named People row.
pub(crate) fn id_map(conn: &Connection) -> Result<HashMap<PersonKey, i64>> {
  let mut ids = HashMap::new();
  for row in all(conn)? {
    if let Some(name) = row.name {
      let key = PersonKey::new(name, row.enslaver_status, row.enslaver_scope_estimate);
      ids.entry(key).or_insert(row.person_id);
    }
  }
  Ok(ids)
}

/// Link a petition to a person unless that exact pair is already present.
///
/// Returns `true` when a row was inserted.
pub(crate) fn link(conn: &Connection, petition_id: i64, person_id: i64) -> Result<bool> {
  let inserted = conn
    .prepare_cached(
      "INSERT INTO Petition_People_Lookup (petition_id, person_id)
       SELECT ?1, ?2
        WHERE NOT EXISTS (
          SELECT 1 FROM Petition_People_Lookup
           WHERE petition_id = ?1 AND person_id = ?2
        )",
    )?
    .execute(params![petition_id, person_id])?;
  Ok(inserted > 0)
}
