use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// Star rating attached to a song review, on a scale of 1 to 5.
///
/// Zero is not a rating: a review without stars is rejected the same way a
/// review without text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  /// Creates a new `Rating`. Values outside `[1, 5]` are rejected.
  pub fn new(value: u8) -> Result<Self, ValidationError> {
    if !(Self::MIN..=Self::MAX).contains(&value) {
      return Err(ValidationError::RatingOutOfRange { value, min: Self::MIN, max: Self::MAX });
    }
    Ok(Self(value))
  }

  pub fn stars(&self) -> u8 {
    self.0
  }
}

impl TryFrom<u8> for Rating {
  type Error = ValidationError;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Rating::new(value)
  }
}

impl From<Rating> for u8 {
  fn from(rating: Rating) -> Self {
    rating.0
  }
}

impl fmt::Display for Rating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for _ in 0..self.0 {
      write!(f, "★")?;
    }
    for _ in self.0..Self::MAX {
      write!(f, "☆")?;
    }
    Ok(())
  }
}
