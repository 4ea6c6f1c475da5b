//! Error types for the dvp-csv reader.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  /// Required columns absent from the header row, in canonical order.
  #[error("missing required column(s): {}", .0.join(", "))]
  MissingColumns(Vec<String>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
