//! Writing a [`Normalized`] batch into a fresh store.
//!
//! The whole store is built in a sibling staging file inside one transaction
//! and renamed over the destination only once it is complete. Readers see the
//! previous store or the new one, never a partial build.

use std::{
  collections::HashMap,
  ffi::OsString,
  path::{Path, PathBuf},
};

use dvp_core::{
  Normalized, PetitionRecord,
  policy::{DuplicateParcel, resolve_additional_request},
};
use rusqlite::{Connection, Transaction, params};
use serde::Serialize;

use crate::{Error, Result, people, schema::SCHEMA};

// ─── Report ──────────────────────────────────────────────────────────────────

/// Rows written per table by one load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
  pub destination:         PathBuf,
  pub petitions:           usize,
  pub reasoning:           usize,
  pub petition_reasoning:  usize,
  pub people:              usize,
  pub petition_people:     usize,
  pub archives:            usize,
  pub courts:              usize,
  pub additional_requests: usize,
  pub results:             usize,
  pub duplicate_parcels:   Vec<DuplicateParcel>,
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Normalize `records` and write them to a new store at `dest`, replacing any
/// store already there.
pub fn load(records: Vec<PetitionRecord>, dest: impl AsRef<Path>) -> Result<LoadReport> {
  load_batch(&Normalized::build(records), dest)
}

/// Write an already-normalized batch to a new store at `dest`.
pub fn load_batch(batch: &Normalized, dest: impl AsRef<Path>) -> Result<LoadReport> {
  let dest = dest.as_ref();
  let staging = staging_path(dest);
  remove_if_present(&staging)?;

  let result = build_store(batch, &staging).and_then(|mut report| {
    std::fs::rename(&staging, dest).map_err(Error::io("cannot publish store to", dest))?;
    report.destination = dest.to_owned();
    Ok(report)
  });

  if result.is_err() {
    // The staging file is unusable after a failed build.
    if let Err(e) = remove_if_present(&staging) {
      tracing::warn!(staging = %staging.display(), error = %e, "could not remove staging file");
    }
  }

  let report = result?;
  tracing::info!(
    destination = %report.destination.display(),
    petitions = report.petitions,
    people = report.people,
    reasoning = report.reasoning,
    additional_requests = report.additional_requests,
    results = report.results,
    "store created"
  );
  Ok(report)
}

/// `<dest>.building`, the file a load writes before publishing.
pub fn staging_path(dest: &Path) -> PathBuf {
  let mut name = OsString::from(dest.as_os_str());
  name.push(".building");
  PathBuf::from(name)
}

fn remove_if_present(path: &Path) -> Result<()> {
  match std::fs::remove_file(path) {
    Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
      Err(Error::io("cannot remove", path)(e))
    }
    _ => Ok(()),
  }
}

fn build_store(batch: &Normalized, path: &Path) -> Result<LoadReport> {
  let mut conn = Connection::open(path)?;
  conn.pragma_update(None, "foreign_keys", true)?;

  let tx = conn.transaction()?;
  tx.execute_batch(SCHEMA)?;
  let report = write_batch(&tx, batch)?;
  tx.commit()?;

  conn.close().map_err(|(_, e)| e)?;
  Ok(report)
}

// ─── Table writers ───────────────────────────────────────────────────────────

fn write_batch(tx: &Transaction<'_>, batch: &Normalized) -> Result<LoadReport> {
  let mut report = LoadReport {
    duplicate_parcels: batch.parcels.duplicates().to_vec(),
    ..Default::default()
  };

  report.reasoning = insert_pairs(
    tx,
    "INSERT INTO Reasoning (reasoning_id, reasoning) VALUES (?1, ?2)",
    batch.reasoning.entries(),
  )?;
  report.archives = insert_pairs(
    tx,
    "INSERT INTO Archive_Lookup (archive_id, archive) VALUES (?1, ?2)",
    batch.archives.entries(),
  )?;

  {
    let mut stmt = tx.prepare("INSERT INTO Court (court, county, state) VALUES (?1, ?2, ?3)")?;
    for court in &batch.courts {
      stmt.execute(params![court.court, court.county, court.state])?;
    }
    report.courts = batch.courts.len();
  }

  // Phase one: make sure every identity exists. Phase two: read back the ids
  // the store assigned; provisional ids from the batch are not used again.
  for (_, key) in batch.people.entries() {
    let (_, created) = people::find_or_insert(tx, key)?;
    if created {
      report.people += 1;
    }
  }
  let person_ids = people::id_map(tx)?;

  let (stored_requests, request_ids) = insert_additional_requests(tx, batch)?;
  report.additional_requests = stored_requests;

  {
    let mut stmt = tx.prepare(
      "INSERT INTO Petitions (
         petition_id, parcel_number, archive, petitioner, defendant,
         month, year, county, state, years_married, additional_requests_id
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for petition in &batch.petitions {
      let r = &petition.record;
      let additional_requests_id =
        resolve_additional_request(r.additional_requests.as_deref(), &request_ids);
      stmt.execute(params![
        petition.petition_id,
        r.parcel_number,
        r.archive,
        r.petitioner,
        r.defendant,
        r.month,
        r.year,
        r.county,
        r.state,
        r.years_married,
        additional_requests_id,
      ])?;
    }
    report.petitions = batch.petitions.len();
  }

  {
    let mut stmt = tx.prepare(
      "INSERT INTO Petition_Reasoning_Lookup (petition_id, reasoning_id) VALUES (?1, ?2)",
    )?;
    for (petition_id, reasoning_id) in &batch.petition_reasoning {
      stmt.execute(params![petition_id, reasoning_id])?;
    }
    report.petition_reasoning = batch.petition_reasoning.len();
  }

  for link in &batch.person_links {
    let person_id = person_ids.get(&link.person).copied().ok_or_else(|| {
      dvp_core::Error::UnknownDimension {
        table: "People",
        value: link.person.name.clone(),
      }
    })?;
    if people::link(tx, link.petition_id, person_id)? {
      report.petition_people += 1;
    }
  }

  {
    let mut stmt = tx.prepare("INSERT INTO Result (petition_id, result) VALUES (?1, ?2)")?;
    for outcome in &batch.outcomes {
      stmt.execute(params![outcome.petition_id, outcome.result])?;
    }
    report.results = batch.outcomes.len();
  }

  Ok(report)
}

fn insert_pairs(tx: &Transaction<'_>, sql: &str, rows: &[(i64, String)]) -> Result<usize> {
  let mut stmt = tx.prepare(sql)?;
  for (id, value) in rows {
    stmt.execute(params![id, value])?;
  }
  Ok(rows.len())
}

/// Store each distinct request token once.
///
/// Returns the stored row count and a lowercase token → id map. When two
/// stored tokens differ only in case, the higher id wins.
fn insert_additional_requests(
  tx: &Transaction<'_>,
  batch: &Normalized,
) -> Result<(usize, HashMap<String, i64>)> {
  {
    let mut stmt = tx.prepare(
      "INSERT OR IGNORE INTO Additional_Requests (additional_requests) VALUES (?1)",
    )?;
    for (_, token) in &batch.additional_request_splits {
      stmt.execute(params![token])?;
    }
  }

  let mut stmt = tx.prepare(
    "SELECT additional_requests_id, additional_requests
       FROM Additional_Requests ORDER BY additional_requests_id",
  )?;
  let rows = stmt
    .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, Option<String>>(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let stored = rows.len();
  let mut ids = HashMap::new();
  for (id, text) in rows {
    if let Some(text) = text {
      ids.insert(text.to_lowercase(), id);
    }
  }
  Ok((stored, ids))
}
