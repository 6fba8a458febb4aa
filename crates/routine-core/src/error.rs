//! Error types for `routine-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("addiction name must not be empty")]
  EmptyName,

  #[error("unknown colour: {0:?}")]
  UnknownColor(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
