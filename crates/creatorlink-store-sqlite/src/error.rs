//! Error type for `creatorlink-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A UNIQUE, CHECK or foreign-key constraint rejected the write.
  #[error("constraint violation: {0}")]
  Conflict(String),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown role: {0:?}")]
  Role(String),

  /// The sign-in code is unknown, expired, or already used.
  #[error("invalid or expired sign-in code")]
  InvalidCode,

  #[error("invalid photo name: {0:?}")]
  PhotoName(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      failure,
      message,
    )) = &e
      && failure.code == rusqlite::ErrorCode::ConstraintViolation
    {
      return Error::Conflict(
        message.clone().unwrap_or_else(|| failure.to_string()),
      );
    }
    Error::Database(e)
  }
}

impl From<Error> for creatorlink_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Conflict(message) => creatorlink_core::Error::Conflict(message),
      Error::InvalidCode => creatorlink_core::Error::Unauthenticated,
      Error::PhotoName(_) => {
        creatorlink_core::Error::invalid("filename", "invalid file name")
      }
      other => creatorlink_core::Error::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
