// crates/songbook-core/src/errors.rs
use thiserror::Error;

/// Rejection raised while building a request type, before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("field `{0}` must not be empty")]
  EmptyField(&'static str),

  #[error("rating must be between {min} and {max}, got {value}")]
  RatingOutOfRange { value: u8, min: u8, max: u8 },

  #[error("`{field}` must be a positive identifier, got {value}")]
  InvalidId { field: &'static str, value: i32 },

  #[error("owner {0} does not exist")]
  UnknownOwner(i32),
}

/// Generic error of the Songbook core.
///
/// Upper layers (HTTP handlers, CLI, etc.) should map this error to user
/// messages or status codes. Every variant is distinguishable: a caller can
/// always tell "you don't own this" from "the database is down".
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("invalid input: {0}")]
  Validation(#[from] ValidationError),

  #[error("not found")]
  NotFound,

  #[error("user is not the owner of this song")]
  Forbidden,

  #[error("repository error: {0}")]
  Repository(String),
}
