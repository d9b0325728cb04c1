use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// Identifier of a song, assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct SongId(i32);

impl SongId {
  /// Builds a `SongId` from a raw store value. Non-positive values are not ids.
  pub fn new(raw: i32) -> Option<Self> {
    (raw > 0).then_some(SongId(raw))
  }

  /// Returns the raw integer as stored in the database.
  pub fn get(&self) -> i32 {
    self.0
  }
}

impl TryFrom<i32> for SongId {
  type Error = ValidationError;

  fn try_from(raw: i32) -> Result<Self, Self::Error> {
    SongId::new(raw).ok_or(ValidationError::InvalidId { field: "id", value: raw })
  }
}

impl From<SongId> for i32 {
  fn from(id: SongId) -> Self {
    id.0
  }
}

impl fmt::Display for SongId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Identifier of a user. Users live outside this crate; songs only reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UserId(i32);

impl UserId {
  pub fn new(raw: i32) -> Option<Self> {
    (raw > 0).then_some(UserId(raw))
  }

  pub fn get(&self) -> i32 {
    self.0
  }
}

impl TryFrom<i32> for UserId {
  type Error = ValidationError;

  fn try_from(raw: i32) -> Result<Self, Self::Error> {
    UserId::new(raw).ok_or(ValidationError::InvalidId { field: "user_id", value: raw })
  }
}

impl From<UserId> for i32 {
  fn from(id: UserId) -> Self {
    id.0
  }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}
