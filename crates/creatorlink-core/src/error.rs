//! Error types for `creatorlink-core`.

use std::collections::BTreeMap;

use thiserror::Error;

/// Per-field validation messages, keyed by the form field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {}", summarize(.0))]
  Validation(FieldErrors),

  #[error("not signed in")]
  Unauthenticated,

  /// The viewer is signed in but has not completed registration.
  #[error("registration is incomplete")]
  ProfileRequired,

  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  #[error("{0} not found")]
  NotFound(&'static str),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("the application deadline has passed")]
  DeadlinePassed,

  #[error("this action must be confirmed")]
  ConfirmationRequired,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Build a single-field validation error.
  pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
    let mut fields = FieldErrors::new();
    fields.insert(field, message.into());
    Self::Validation(fields)
  }

  /// Wrap an arbitrary backend failure.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<std::convert::Infallible> for Error {
  fn from(e: std::convert::Infallible) -> Self { match e {} }
}

fn summarize(fields: &FieldErrors) -> String {
  fields
    .iter()
    .map(|(field, msg)| format!("{field}: {msg}"))
    .collect::<Vec<_>>()
    .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
