//! Error type for `billwatch-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] billwatch_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The bill failed validation and was not saved.
  #[error("invalid bill: {0}")]
  Validation(String),

  #[error("bill not found: {0}")]
  BillNotFound(uuid::Uuid),

  #[error("a {0} sync run is already running")]
  SyncInProgress(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
