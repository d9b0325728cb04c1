use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::ids::{SongId, UserId};
use crate::domain::rating::Rating;
use crate::errors::ValidationError;

/// A reviewed song as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
  /// Identifier assigned by the store.
  pub id: SongId,
  pub title: String,
  pub artist: String,
  pub genre: String,
  /// Free-form review text written by the owner.
  pub review: String,
  pub rating: Rating,
  /// Server time at insert. Never changes afterwards.
  pub created_at: NaiveDateTime,
  /// The user who created the song; the only one allowed to edit or delete it.
  pub owner_id: UserId,
}

/// Read-only view of the user owning a song, joined from the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongOwner {
  pub id: UserId,
  pub username: String,
  pub full_name: String,
  pub profile_image: Option<String>,
}

/// What list, get and search return: the song plus its owner's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongWithOwner {
  #[serde(flatten)]
  pub song: Song,
  pub owner: SongOwner,
}

/// The editable part of a song.
///
/// Can only be obtained through [`SongDetails::new`] (or deserialization, which
/// goes through the same checks), so every value in circulation has non-empty,
/// trimmed text and a valid rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSongDetails")]
pub struct SongDetails {
  title: String,
  artist: String,
  genre: String,
  review: String,
  rating: Rating,
}

impl SongDetails {
  pub fn new(
    title: impl Into<String>,
    artist: impl Into<String>,
    genre: impl Into<String>,
    review: impl Into<String>,
    rating: Rating,
  ) -> Result<Self, ValidationError> {
    Ok(Self {
      title: required("title", title.into())?,
      artist: required("artist", artist.into())?,
      genre: required("genre", genre.into())?,
      review: required("review", review.into())?,
      rating,
    })
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn artist(&self) -> &str {
    &self.artist
  }

  pub fn genre(&self) -> &str {
    &self.genre
  }

  pub fn review(&self) -> &str {
    &self.review
  }

  pub fn rating(&self) -> Rating {
    self.rating
  }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ValidationError::EmptyField(field));
  }
  if trimmed.len() == value.len() { Ok(value) } else { Ok(trimmed.to_owned()) }
}

#[derive(Deserialize)]
struct RawSongDetails {
  title: String,
  artist: String,
  genre: String,
  review: String,
  rating: u8,
}

impl TryFrom<RawSongDetails> for SongDetails {
  type Error = ValidationError;

  fn try_from(raw: RawSongDetails) -> Result<Self, Self::Error> {
    SongDetails::new(raw.title, raw.artist, raw.genre, raw.review, Rating::new(raw.rating)?)
  }
}

/// Request to create a song. The creation timestamp is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
  pub owner_id: UserId,
  #[serde(flatten)]
  pub details: SongDetails,
}

impl NewSong {
  pub fn new(owner_id: UserId, details: SongDetails) -> Self {
    Self { owner_id, details }
  }
}

/// Request to replace the editable fields of an existing song.
///
/// `owner_id` is the caller's identity: the write only happens when it matches
/// the stored owner. Owner and creation time themselves are never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongUpdate {
  pub id: SongId,
  pub owner_id: UserId,
  #[serde(flatten)]
  pub details: SongDetails,
}

impl SongUpdate {
  pub fn new(id: SongId, owner_id: UserId, details: SongDetails) -> Self {
    Self { id, owner_id, details }
  }
}
