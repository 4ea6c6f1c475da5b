//! Error type for `dvp-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] dvp_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("{action} {}: {source}", .path.display())]
  Io {
    action: &'static str,
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The migration target does not exist; nothing was backed up or changed.
  #[error("database {} not found", .0.display())]
  StoreNotFound(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Error::Io { action, path, source }
  }
}
