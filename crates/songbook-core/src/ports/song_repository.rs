use crate::domain::{NewSong, SongId, SongUpdate, SongWithOwner, UserId};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
  #[error("song not found")]
  NotFound,
  #[error("song belongs to another user")]
  NotOwner,
  #[error("owner {0} does not exist")]
  InvalidOwner(UserId),
  #[error("storage error: {0}")]
  Storage(String),
}

/// Persistence port for the song catalog.
///
/// Read operations return `Ok(None)` / an empty `Vec` only when nothing
/// matches; any execution failure is an `Err`. Mutations are authorized by the
/// adapter in the same statement that performs the write.
pub trait SongRepository {
  /// Every song with its owner, newest first.
  fn list_songs(&self) -> Result<Vec<SongWithOwner>, RepoError>;

  fn get_song(&self, id: SongId) -> Result<Option<SongWithOwner>, RepoError>;

  /// Songs whose title, artist or genre contains `term`, ignoring case, newest
  /// first. An empty term matches every song.
  fn search_songs(&self, term: &str) -> Result<Vec<SongWithOwner>, RepoError>;

  fn insert_song(&self, song: &NewSong) -> Result<SongId, RepoError>;

  /// Fails with `NotFound` if the id is unknown and `NotOwner` if the song
  /// belongs to someone other than `update.owner_id`.
  fn update_song(&self, update: &SongUpdate) -> Result<(), RepoError>;

  fn delete_song(&self, id: SongId, owner_id: UserId) -> Result<(), RepoError>;

  /// True iff a song with exactly this (id, owner) pair exists right now.
  fn can_user_edit(&self, id: SongId, owner_id: UserId) -> Result<bool, RepoError>;
}
