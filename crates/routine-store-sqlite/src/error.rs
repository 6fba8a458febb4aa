//! Error type for `routine-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] routine_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("addiction not found: {0}")]
  AddictionNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
