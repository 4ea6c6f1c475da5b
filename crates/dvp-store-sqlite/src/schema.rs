//! SQL schema for the petitions store.
//!
//! Executed once against a fresh staging file. Every load recreates the whole
//! store, so there is no version gating.
//!
//! `Petition_People_Lookup` declares no foreign keys and no uniqueness: it is
//! not validated against `Petitions` or `People`. Writers keep it free of
//! duplicate pairs with an explicit existence check.

/// Full schema DDL. Foreign-key enforcement is switched on by the connection
/// before this runs, since the pragma has no effect inside a transaction.
pub const SCHEMA: &str = "
CREATE TABLE Additional_Requests (
    additional_requests_id INTEGER PRIMARY KEY AUTOINCREMENT,
    additional_requests    TEXT UNIQUE
);

CREATE TABLE Petitions (
    petition_id            INTEGER PRIMARY KEY,
    parcel_number          TEXT,      -- natural key; not enforced unique
    archive                TEXT,
    petitioner             TEXT,
    defendant              TEXT,
    month                  TEXT,
    year                   TEXT,
    county                 TEXT,
    state                  TEXT,
    years_married          TEXT,
    additional_requests_id INTEGER,
    FOREIGN KEY(additional_requests_id) REFERENCES Additional_Requests(additional_requests_id)
);

CREATE TABLE Petition_Reasoning_Lookup (
    petition_id  INTEGER,
    reasoning_id INTEGER
);

-- UNIQUE does not treat NULLs as equal; the triple is additionally kept
-- unique by NULL-aware lookup before every insert.
CREATE TABLE People (
    person_id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name                    TEXT,
    enslaver_status         TEXT,
    enslaver_scope_estimate TEXT,
    UNIQUE(name, enslaver_status, enslaver_scope_estimate)
);

CREATE TABLE Petition_People_Lookup (
    petition_id INTEGER,
    person_id   INTEGER
);

CREATE TABLE Reasoning (
    reasoning_id INTEGER PRIMARY KEY,
    reasoning    TEXT
);

CREATE TABLE Archive_Lookup (
    archive_id INTEGER PRIMARY KEY,
    archive    TEXT
);

CREATE TABLE Court (
    court  TEXT,
    county TEXT,
    state  TEXT
);

CREATE TABLE Result (
    petition_id INTEGER,
    result      TEXT
);
";
