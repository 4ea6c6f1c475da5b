//! Integration tests for loading and migrating on-disk stores.

use std::{
  collections::{BTreeSet, HashSet},
  path::{Path, PathBuf},
};

use dvp_core::PetitionRecord;
use rusqlite::Connection;
use tempfile::TempDir;

use crate::{Error, load, load::staging_path, split_people};

type Triple = (String, Option<String>, Option<String>);

fn record(parcel: &str, petitioner: &str, defendant: &str) -> PetitionRecord {
  PetitionRecord {
    parcel_number: parcel.into(),
    archive: "State Archives of North Carolina".into(),
    petitioner: petitioner.into(),
    defendant: defendant.into(),
    month: "May".into(),
    year: "1851".into(),
    county: "Wake".into(),
    state: "NC".into(),
    years_married: "4".into(),
    reasoning: "cruelty".into(),
    result: "granted".into(),
    ..Default::default()
  }
}

fn scenario_row() -> PetitionRecord {
  PetitionRecord {
    reasoning: "cruelty, desertion".into(),
    result: "Denied, granted".into(),
    additional_requests: Some("alimony, custody".into()),
    enslaver_status: Some("enslaver".into()),
    enslaver_scope_estimate: Some("small".into()),
    ..record("P1", "Jane Doe, Mary Doe", "John Doe")
  }
}

fn loaded(records: Vec<PetitionRecord>) -> (TempDir, PathBuf) {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("dv_petitions.db");
  load(records, &db).unwrap();
  (dir, db)
}

fn open(db: &Path) -> Connection { Connection::open(db).unwrap() }

fn count(db: &Path, table: &str) -> i64 {
  open(db)
    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
    .unwrap()
}

fn people(db: &Path) -> Vec<Triple> {
  let conn = open(db);
  let mut stmt = conn
    .prepare(
      "SELECT name, enslaver_status, enslaver_scope_estimate FROM People ORDER BY person_id",
    )
    .unwrap();
  stmt
    .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap()
}

fn person(db: &Path, name: &str) -> Triple {
  let matches: Vec<_> = people(db).into_iter().filter(|p| p.0 == name).collect();
  assert_eq!(matches.len(), 1, "expected exactly one {name:?}");
  matches.into_iter().next().unwrap()
}

/// Names linked to `petition_id`, sorted.
fn linked_names(db: &Path, petition_id: i64) -> Vec<String> {
  let conn = open(db);
  let mut stmt = conn
    .prepare(
      "SELECT p.name FROM Petition_People_Lookup l
         JOIN People p ON p.person_id = l.person_id
        WHERE l.petition_id = ?1 ORDER BY p.name",
    )
    .unwrap();
  stmt
    .query_map([petition_id], |r| r.get(0))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap()
}

/// The junction as `(petition_id, name)` pairs, independent of person ids.
fn link_set(db: &Path) -> BTreeSet<(i64, String)> {
  let conn = open(db);
  let mut stmt = conn
    .prepare(
      "SELECT l.petition_id, p.name FROM Petition_People_Lookup l
         JOIN People p ON p.person_id = l.person_id",
    )
    .unwrap();
  stmt
    .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap()
}

fn assert_triples_unique(db: &Path) {
  let all = people(db);
  let distinct: HashSet<_> = all.iter().collect();
  assert_eq!(distinct.len(), all.len(), "duplicate People triple in {all:?}");
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[test]
fn scenario_load_builds_every_table() {
  let (_dir, db) = loaded(vec![scenario_row()]);
  let conn = open(&db);

  let reasoning: Vec<String> = conn
    .prepare("SELECT reasoning FROM Reasoning ORDER BY reasoning_id")
    .unwrap()
    .query_map([], |r| r.get(0))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap();
  assert_eq!(reasoning, ["cruelty", "desertion"]);
  assert_eq!(count(&db, "Petition_Reasoning_Lookup"), 2);

  let results: Vec<(i64, String)> = conn
    .prepare("SELECT petition_id, result FROM Result ORDER BY rowid")
    .unwrap()
    .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap();
  assert_eq!(results, [(1, "rejected".to_owned()), (1, "granted".to_owned())]);

  let requests: Vec<(i64, String)> = conn
    .prepare(
      "SELECT additional_requests_id, additional_requests
         FROM Additional_Requests ORDER BY additional_requests_id",
    )
    .unwrap()
    .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap();
  assert_eq!(requests, [(1, "alimony".to_owned()), (2, "custody".to_owned())]);

  let request_id: Option<i64> = conn
    .query_row(
      "SELECT additional_requests_id FROM Petitions WHERE petition_id = 1",
      [],
      |r| r.get(0),
    )
    .unwrap();
  assert_eq!(request_id, Some(1));

  assert_eq!(count(&db, "Archive_Lookup"), 1);
  assert_eq!(count(&db, "Court"), 1);
  assert_eq!(people(&db).len(), 2);
  assert_eq!(linked_names(&db, 1), ["Jane Doe, Mary Doe", "John Doe"]);
}

#[test]
fn reasoning_lookup_matches_token_count_per_petition() {
  let mut a = record("P1", "A", "B");
  a.reasoning = " adultery , cruelty,,desertion ".into();
  let mut b = record("P2", "C", "D");
  b.reasoning = "cruelty".into();
  let mut c = record("P3", "E", "F");
  c.reasoning = String::new();

  let (_dir, db) = loaded(vec![a, b, c]);
  let conn = open(&db);
  let per_petition = |id: i64| -> i64 {
    conn
      .query_row(
        "SELECT COUNT(*) FROM Petition_Reasoning_Lookup WHERE petition_id = ?1",
        [id],
        |r| r.get(0),
      )
      .unwrap()
  };

  assert_eq!(count(&db, "Reasoning"), 3);
  assert_eq!(per_petition(1), 3);
  assert_eq!(per_petition(2), 1);
  assert_eq!(per_petition(3), 0);
}

#[test]
fn people_with_same_name_but_no_status_are_stored_once() {
  let (_dir, db) = loaded(vec![
    record("P1", "Jane Doe", "John Doe"),
    record("P2", "Jane Doe", "Richard Roe"),
  ]);

  assert_eq!(people(&db).len(), 3);
  assert_eq!(person(&db, "Jane Doe"), ("Jane Doe".to_owned(), None, None));
  assert_triples_unique(&db);
}

#[test]
fn same_name_with_different_status_is_a_different_person() {
  let mut a = record("P1", "Jane Doe", "John Doe");
  a.enslaver_status = Some("enslaver".into());
  let b = record("P2", "Jane Doe", "John Doe");

  let (_dir, db) = loaded(vec![a, b]);

  assert_eq!(people(&db).len(), 4);
  assert_triples_unique(&db);
}

#[test]
fn empty_role_creates_no_person_or_link() {
  let (_dir, db) = loaded(vec![record("P1", "", "John Doe"), record("P2", "Jane Doe", "")]);

  assert_eq!(people(&db).len(), 2);
  assert_eq!(linked_names(&db, 1), ["John Doe"]);
  assert_eq!(linked_names(&db, 2), ["Jane Doe"]);
  assert_eq!(count(&db, "Petition_People_Lookup"), 2);
}

#[test]
fn only_denied_is_renamed() {
  let mut a = record("P1", "A", "B");
  a.result = "DENIED, Granted in part,denied".into();

  let (_dir, db) = loaded(vec![a]);
  let conn = open(&db);
  let results: Vec<String> = conn
    .prepare("SELECT result FROM Result ORDER BY rowid")
    .unwrap()
    .query_map([], |r| r.get(0))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap();
  assert_eq!(results, ["rejected", "Granted in part", "rejected"]);
}

#[test]
fn petition_without_requests_has_null_request_id() {
  let (_dir, db) = loaded(vec![record("P1", "A", "B")]);
  let id: Option<i64> = open(&db)
    .query_row("SELECT additional_requests_id FROM Petitions", [], |r| r.get(0))
    .unwrap();
  assert_eq!(id, None);
  assert_eq!(count(&db, "Additional_Requests"), 0);
}

#[test]
fn request_tokens_differing_in_case_resolve_to_the_later_id() {
  let mut a = record("P1", "A", "B");
  a.additional_requests = Some("Alimony".into());
  let mut b = record("P2", "C", "D");
  b.additional_requests = Some("alimony".into());
  let (_dir, db) = loaded(vec![a, b]);

  assert_eq!(count(&db, "Additional_Requests"), 2);
  let conn = open(&db);
  let mut stmt = conn
    .prepare("SELECT additional_requests_id FROM Petitions ORDER BY petition_id")
    .unwrap();
  let ids: Vec<Option<i64>> = stmt
    .query_map([], |r| r.get(0))
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap();
  assert_eq!(ids, [Some(2), Some(2)]);
}

#[test]
fn duplicate_parcels_are_reported_not_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("store.db");
  let report = load(vec![record("P1", "A", "B"), record("P1", "C", "D")], &db).unwrap();

  assert_eq!(report.petitions, 2);
  assert_eq!(report.duplicate_parcels.len(), 1);
  assert_eq!(report.duplicate_parcels[0].winner, 2);
  assert_eq!(linked_names(&db, 2), ["C", "D"]);
}

#[test]
fn load_replaces_existing_store() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("store.db");
  std::fs::write(&db, b"not a database").unwrap();

  load(vec![record("P1", "A", "B")], &db).unwrap();
  assert_eq!(count(&db, "Petitions"), 1);

  load(vec![record("P1", "A", "B"), record("P2", "C", "D")], &db).unwrap();
  assert_eq!(count(&db, "Petitions"), 2);
  assert!(!staging_path(&db).exists());
}

#[test]
fn failed_load_leaves_previous_store_untouched() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("store.db");
  load(vec![record("P1", "A", "B")], &db).unwrap();

  // A directory squatting on the staging path cannot be replaced by a file.
  std::fs::create_dir(staging_path(&db)).unwrap();
  let err = load(vec![record("P2", "C", "D")], &db).unwrap_err();

  assert!(matches!(err, Error::Io { .. }));
  assert_eq!(count(&db, "Petitions"), 1);
}

// ─── Migration ───────────────────────────────────────────────────────────────

#[test]
fn scenario_migration_splits_names() {
  let (_dir, db) = loaded(vec![scenario_row()]);

  let report = split_people(&db).unwrap();

  assert_eq!(report.rows_split, 1);
  assert_eq!(report.remaining_multi_name, 0);
  assert_eq!(people(&db).len(), 3);
  assert_eq!(
    person(&db, "Jane Doe"),
    ("Jane Doe".to_owned(), Some("enslaver".to_owned()), Some("small".to_owned()))
  );
  assert_eq!(person(&db, "Mary Doe"), ("Mary Doe".to_owned(), None, None));
  assert_eq!(
    person(&db, "John Doe"),
    ("John Doe".to_owned(), Some("enslaver".to_owned()), Some("small".to_owned()))
  );
  assert_eq!(linked_names(&db, 1), ["Jane Doe", "John Doe", "Mary Doe"]);
  assert_eq!(report.links_after, 3);
}

#[test]
fn migration_is_idempotent() {
  let mut b = record("P2", "Mary Doe, Ann Roe", "Jane Doe, Mary Doe");
  b.enslaver_status = Some("none".into());
  let (_dir, db) = loaded(vec![scenario_row(), b, record("P3", "Ann Roe", "")]);

  split_people(&db).unwrap();
  let people_once: HashSet<_> = people(&db).into_iter().collect();
  let links_once = link_set(&db);
  let link_rows_once = count(&db, "Petition_People_Lookup");

  let second = split_people(&db).unwrap();

  assert_eq!(second.rows_split, 0);
  assert_eq!(second.people_created, 0);
  assert_eq!(people(&db).into_iter().collect::<HashSet<_>>(), people_once);
  assert_eq!(link_set(&db), links_once);
  assert_eq!(count(&db, "Petition_People_Lookup"), link_rows_once);
  assert_triples_unique(&db);
}

#[test]
fn later_split_names_reuse_existing_bare_people() {
  let (_dir, db) = loaded(vec![scenario_row(), record("P2", "Mary Doe", "")]);

  let report = split_people(&db).unwrap();

  assert_eq!(report.people_created, 1); // Jane Doe with the row's status
  assert_eq!(person(&db, "Mary Doe"), ("Mary Doe".to_owned(), None, None));
  assert_eq!(linked_names(&db, 2), ["Mary Doe"]);
  assert!(linked_names(&db, 1).contains(&"Mary Doe".to_owned()));
  assert_triples_unique(&db);
}

/// Loads a single `Jane Doe` and a `Jane Doe, Mary Doe` row sharing the
/// given status and scope, splits, and checks the first name was reused.
fn assert_split_reuses_partial_identity(status: Option<&str>, scope: Option<&str>) {
  let with_identity = |mut r: PetitionRecord| {
    r.enslaver_status = status.map(Into::into);
    r.enslaver_scope_estimate = scope.map(Into::into);
    r
  };
  let (_dir, db) = loaded(vec![
    with_identity(record("P1", "Jane Doe", "")),
    with_identity(record("P2", "Jane Doe, Mary Doe", "")),
  ]);

  let report = split_people(&db).unwrap();

  assert_eq!(report.rows_split, 1);
  assert_eq!(report.people_created, 1); // Mary Doe only
  assert_eq!(
    person(&db, "Jane Doe"),
    ("Jane Doe".to_owned(), status.map(Into::into), scope.map(Into::into))
  );
  assert_eq!(person(&db, "Mary Doe"), ("Mary Doe".to_owned(), None, None));
  assert_eq!(linked_names(&db, 1), ["Jane Doe"]);
  assert_eq!(linked_names(&db, 2), ["Jane Doe", "Mary Doe"]);
  assert_triples_unique(&db);
}

#[test]
fn split_reuses_person_with_status_but_no_scope() {
  assert_split_reuses_partial_identity(Some("enslaver"), None);
}

#[test]
fn split_reuses_person_with_scope_but_no_status() {
  assert_split_reuses_partial_identity(None, Some("small"));
}

#[test]
fn untouched_people_keep_their_ids_and_links() {
  let (_dir, db) = loaded(vec![record("P1", "Jane Doe", "John Doe")]);
  let before = link_set(&db);

  let report = split_people(&db).unwrap();

  assert_eq!(report.rows_split, 0);
  assert_eq!(report.links_before, report.links_after);
  assert_eq!(link_set(&db), before);
}

#[test]
fn migration_backs_up_the_unmigrated_store() {
  let (_dir, db) = loaded(vec![scenario_row()]);

  let report = split_people(&db).unwrap();

  assert!(report.backup.exists());
  assert_ne!(report.backup, db);
  assert_eq!(count(&report.backup, "People"), 2);
  assert_eq!(count(&db, "People"), 3);
}

#[test]
fn migration_of_missing_store_fails_before_backup() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("absent.db");

  let err = split_people(&db).unwrap_err();

  assert!(matches!(err, Error::StoreNotFound(ref p) if p == &db));
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
