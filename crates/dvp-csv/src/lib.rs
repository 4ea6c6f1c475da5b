//! CSV reader for cleaned petition exports.
//!
//! Converts a UTF-8 CSV file into [`dvp_core`] rows. Every header name and
//! cell is trimmed of surrounding whitespace; no other interpretation is
//! applied. Required columns are validated before any row is returned.
//!
//! # Quick start
//!
//! ```no_run
//! let records = dvp_csv::read_path("nc_al_tn_clean_data.csv").unwrap();
//! println!("{} petitions", records.len());
//! ```

pub mod error;
mod parse;

use std::{fs::File, io, path::Path};

use dvp_core::PetitionRecord;
pub use error::{Error, Result};

use parse::Columns;

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Read every row of the CSV file at `path`.
pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<PetitionRecord>> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|source| Error::Io {
    path: path.to_owned(),
    source,
  })?;
  let records = read(file)?;
  tracing::info!(path = %path.display(), rows = records.len(), "read petition csv");
  Ok(records)
}

/// Read every row from `input`.
///
/// Rows shorter than the header read their missing cells as empty; extra
/// cells are ignored.
pub fn read<R: io::Read>(input: R) -> Result<Vec<PetitionRecord>> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .from_reader(input);

  let columns = Columns::from_headers(reader.headers()?)?;

  reader
    .records()
    .map(|row| Ok(columns.decode(&row?)))
    .collect()
}
