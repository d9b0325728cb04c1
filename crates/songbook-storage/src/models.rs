use crate::schema::tbl_songs;
use crate::schema::tbl_users;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use songbook_core::domain::{
  NewSong, Rating, Song, SongDetails, SongId, SongOwner, SongWithOwner, UserId,
};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tbl_songs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SongRow {
  pub id: i32,
  pub title: String,
  pub artist: String,
  pub genre: String,
  pub review: String,
  pub rating: i32,
  pub user_id: i32,
  pub created_at: NaiveDateTime,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tbl_users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
  pub id: i32,
  pub username: String,
  pub full_name: String,
  pub profile_image: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tbl_songs)]
pub struct NewSongRow<'a> {
  pub title: &'a str,
  pub artist: &'a str,
  pub genre: &'a str,
  pub review: &'a str,
  pub rating: i32,
  pub user_id: i32,
  pub created_at: NaiveDateTime,
}

/// Columns an update may touch. `user_id` and `created_at` are deliberately absent.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = tbl_songs)]
pub struct SongChangesRow<'a> {
  pub title: &'a str,
  pub artist: &'a str,
  pub genre: &'a str,
  pub review: &'a str,
  pub rating: i32,
}

/// Users are managed elsewhere; this row exists for seeding and fixtures.
#[derive(Debug, Insertable)]
#[diesel(table_name = tbl_users)]
pub struct NewUserRow<'a> {
  pub id: i32,
  pub username: &'a str,
  pub full_name: &'a str,
  pub profile_image: Option<&'a str>,
}

impl<'a> NewSongRow<'a> {
  pub fn from_domain(song: &'a NewSong, created_at: NaiveDateTime) -> Self {
    let d = &song.details;
    NewSongRow {
      title: d.title(),
      artist: d.artist(),
      genre: d.genre(),
      review: d.review(),
      rating: i32::from(d.rating().stars()),
      user_id: song.owner_id.get(),
      created_at,
    }
  }
}

impl<'a> From<&'a SongDetails> for SongChangesRow<'a> {
  fn from(d: &'a SongDetails) -> Self {
    SongChangesRow {
      title: d.title(),
      artist: d.artist(),
      genre: d.genre(),
      review: d.review(),
      rating: i32::from(d.rating().stars()),
    }
  }
}

/// A row that cannot be represented in the domain (only possible if the
/// table was written around the constraints).
#[derive(Debug, thiserror::Error)]
#[error("corrupt row in {table} (id {id}): {reason}")]
pub struct CorruptRow {
  pub table: &'static str,
  pub id: i32,
  pub reason: String,
}

impl SongRow {
  pub fn into_domain(self) -> Result<Song, CorruptRow> {
    let corrupt = |reason: String| CorruptRow { table: "tbl_songs", id: self.id, reason };

    let id = SongId::new(self.id).ok_or_else(|| corrupt("non-positive id".into()))?;
    let owner_id = UserId::new(self.user_id).ok_or_else(|| corrupt("non-positive user_id".into()))?;
    let stars = u8::try_from(self.rating).map_err(|e| corrupt(e.to_string()))?;
    let rating = Rating::new(stars).map_err(|e| corrupt(e.to_string()))?;

    Ok(Song {
      id,
      title: self.title,
      artist: self.artist,
      genre: self.genre,
      review: self.review,
      rating,
      created_at: self.created_at,
      owner_id,
    })
  }
}

impl UserRow {
  pub fn into_domain(self) -> Result<SongOwner, CorruptRow> {
    let id = UserId::new(self.id).ok_or_else(|| CorruptRow {
      table: "tbl_users",
      id: self.id,
      reason: "non-positive id".into(),
    })?;

    Ok(SongOwner {
      id,
      username: self.username,
      full_name: self.full_name,
      profile_image: self.profile_image,
    })
  }
}

pub fn row_to_song_with_owner((song, owner): (SongRow, UserRow)) -> Result<SongWithOwner, CorruptRow> {
  Ok(SongWithOwner { song: song.into_domain()?, owner: owner.into_domain()? })
}
