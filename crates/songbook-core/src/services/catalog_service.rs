use tracing::{debug, info, warn};

use crate::domain::{NewSong, SongId, SongUpdate, SongWithOwner, UserId};
use crate::errors::{CoreError, ValidationError};
use crate::ports::{RepoError, SongRepository};

/// Entry point for the presentation layer.
///
/// Wraps a [`SongRepository`] and translates its errors into [`CoreError`]s.
pub struct CatalogService<R>
where
  R: SongRepository,
{
  repo: R,
}

impl<R> CatalogService<R>
where
  R: SongRepository,
{
  pub fn new(repo: R) -> Self {
    Self { repo }
  }

  // -------- QUERY (read) --------

  pub fn list_songs(&self) -> Result<Vec<SongWithOwner>, CoreError> {
    let songs = self.repo.list_songs().map_err(|e| read_failed("list", e))?;
    debug!(count = songs.len(), "listed songs");
    Ok(songs)
  }

  pub fn get_song(&self, id: SongId) -> Result<Option<SongWithOwner>, CoreError> {
    self.repo.get_song(id).map_err(|e| read_failed("get", e))
  }

  /// Like [`get_song`](Self::get_song), but absence is an error.
  pub fn require_song(&self, id: SongId) -> Result<SongWithOwner, CoreError> {
    self.get_song(id)?.ok_or(CoreError::NotFound)
  }

  pub fn search_songs(&self, term: &str) -> Result<Vec<SongWithOwner>, CoreError> {
    let songs = self.repo.search_songs(term).map_err(|e| read_failed("search", e))?;
    debug!(term, count = songs.len(), "searched songs");
    Ok(songs)
  }

  pub fn can_user_edit(&self, id: SongId, owner_id: UserId) -> Result<bool, CoreError> {
    self.repo.can_user_edit(id, owner_id).map_err(|e| read_failed("can_user_edit", e))
  }

  // -------- COMMAND (write) --------

  pub fn create_song(&self, song: &NewSong) -> Result<SongId, CoreError> {
    match self.repo.insert_song(song) {
      Ok(id) => {
        info!(song_id = %id, owner_id = %song.owner_id, "song created");
        Ok(id)
      }
      Err(e) => {
        warn!(owner_id = %song.owner_id, error = %e, "song creation rejected");
        Err(map_repo_error(e))
      }
    }
  }

  pub fn update_song(&self, update: &SongUpdate) -> Result<(), CoreError> {
    match self.repo.update_song(update) {
      Ok(()) => {
        info!(song_id = %update.id, owner_id = %update.owner_id, "song updated");
        Ok(())
      }
      Err(e) => {
        warn!(song_id = %update.id, owner_id = %update.owner_id, error = %e, "song update rejected");
        Err(map_repo_error(e))
      }
    }
  }

  pub fn delete_song(&self, id: SongId, owner_id: UserId) -> Result<(), CoreError> {
    match self.repo.delete_song(id, owner_id) {
      Ok(()) => {
        info!(song_id = %id, owner_id = %owner_id, "song deleted");
        Ok(())
      }
      Err(e) => {
        warn!(song_id = %id, owner_id = %owner_id, error = %e, "song deletion rejected");
        Err(map_repo_error(e))
      }
    }
  }
}

fn read_failed(op: &'static str, err: RepoError) -> CoreError {
  warn!(op, error = %err, "song query failed");
  map_repo_error(err)
}

fn map_repo_error(err: RepoError) -> CoreError {
  match err {
    RepoError::NotFound => CoreError::NotFound,
    RepoError::NotOwner => CoreError::Forbidden,
    RepoError::InvalidOwner(owner) => CoreError::Validation(ValidationError::UnknownOwner(owner.get())),
    RepoError::Storage(msg) => CoreError::Repository(msg),
  }
}
