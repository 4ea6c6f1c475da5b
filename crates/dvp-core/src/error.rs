//! Error types for `dvp-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A junction row referenced a dimension value that was never registered.
  #[error("unknown {table} value: {value:?}")]
  UnknownDimension { table: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
