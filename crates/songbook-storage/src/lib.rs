pub mod config;
pub mod models;
pub mod schema;

use std::fmt::Display;

use chrono::{Local, SubsecRound};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::debug;

use songbook_core::domain::{NewSong, SongId, SongUpdate, SongWithOwner, UserId};
use songbook_core::ports::{RepoError, SongRepository};

pub use crate::config::StorageConfig;
use crate::models::{NewSongRow, SongChangesRow, SongRow, UserRow, row_to_song_with_owner};
use crate::schema::{tbl_songs, tbl_users};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
pub type SqlitePooledConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

diesel::define_sql_function! {
  /// Unicode lowercase, registered on every pooled connection. SQLite's own
  /// `lower()` and `LIKE` only fold ASCII.
  fn fold_case(text: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Per-connection settings applied every time the pool hands out a connection.
#[derive(Debug)]
struct ConnectionPragmas {
  journal_mode: Option<String>,
  busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    // busy_timeout goes first so the journal_mode switch waits instead of failing
    let mut pragmas = format!("PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;", self.busy_timeout_ms);
    if let Some(mode) = &self.journal_mode {
      pragmas.push_str(&format!(" PRAGMA journal_mode = {mode};"));
    }
    conn.batch_execute(&pragmas).map_err(diesel::r2d2::Error::QueryError)?;

    fold_case_utils::register_impl(conn, |text: String| text.to_lowercase())
      .map_err(diesel::r2d2::Error::QueryError)
  }
}

/// SQLite adapter for [`SongRepository`].
///
/// Holds an r2d2 pool, so a single store can be shared across threads.
pub struct SqliteSongRepository {
  pool: SqlitePool,
}

impl SqliteSongRepository {
  /// Opens (or creates) the database file at `database_url` with default settings.
  pub fn new(database_url: &str) -> Result<Self, RepoError> {
    Self::open(&StorageConfig::for_path(database_url))
  }

  /// Reads `[storage]` from songbook.toml and opens the configured database.
  pub fn new_from_config() -> Result<Self, RepoError> {
    let cfg = StorageConfig::load().map_err(storage_err)?;
    Self::open(&cfg)
  }

  pub fn open(cfg: &StorageConfig) -> Result<Self, RepoError> {
    let pragmas = ConnectionPragmas {
      journal_mode: cfg.normalized_journal_mode().map_err(storage_err)?,
      busy_timeout_ms: cfg.busy_timeout_ms,
    };

    if let Some(parent) = cfg.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(storage_err)?;
    }

    let manager = ConnectionManager::<SqliteConnection>::new(cfg.db_path.to_string_lossy());
    let pool = Pool::builder()
      .max_size(cfg.pool_size.max(1))
      .min_idle(Some(1))
      .connection_customizer(Box::new(pragmas))
      .build(manager)
      .map_err(storage_err)?;

    let store = Self { pool };
    store.run_migrations()?;
    debug!(db_path = %cfg.db_path.display(), "song store ready");
    Ok(store)
  }

  /// Checks a connection out of the pool, for callers that need raw access
  /// (seeding users, fixtures).
  pub fn connection(&self) -> Result<SqlitePooledConnection, RepoError> {
    self.pool.get().map_err(storage_err)
  }

  fn run_migrations(&self) -> Result<(), RepoError> {
    let mut pooled = self.connection()?;
    let conn: &mut SqliteConnection = &mut pooled;
    let applied = conn
      .run_pending_migrations(MIGRATIONS)
      .map_err(|e| storage_err(format!("migrations: {e}")))?;
    for version in applied {
      debug!(%version, "applied migration");
    }
    Ok(())
  }

  /// Runs `write` (an UPDATE or DELETE already filtered on id and owner) and,
  /// if it touched nothing, works out why inside the same write transaction.
  fn guarded_write<F>(&self, id: SongId, write: F) -> Result<(), RepoError>
  where
    F: FnOnce(&mut SqliteConnection) -> QueryResult<usize>,
  {
    let mut conn = self.connection()?;
    let outcome = conn
      .immediate_transaction::<_, DieselError, _>(|conn| {
        if write(conn)? > 0 {
          return Ok(GuardedWrite::Applied);
        }
        let exists = diesel::select(diesel::dsl::exists(tbl_songs::table.filter(tbl_songs::id.eq(id.get()))))
          .get_result::<bool>(conn)?;
        Ok(if exists { GuardedWrite::NotOwner } else { GuardedWrite::Missing })
      })
      .map_err(storage_err)?;

    match outcome {
      GuardedWrite::Applied => Ok(()),
      GuardedWrite::NotOwner => Err(RepoError::NotOwner),
      GuardedWrite::Missing => Err(RepoError::NotFound),
    }
  }
}

enum GuardedWrite {
  Applied,
  NotOwner,
  Missing,
}

// Not logged here: the service layer reports failures once.
fn storage_err<E: Display>(e: E) -> RepoError {
  RepoError::Storage(e.to_string())
}

fn into_songs(rows: Vec<(SongRow, UserRow)>) -> Result<Vec<SongWithOwner>, RepoError> {
  rows.into_iter().map(|row| row_to_song_with_owner(row).map_err(storage_err)).collect()
}

/// `%term%` with LIKE wildcards in `term` escaped by `\`.
fn contains_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

impl SongRepository for SqliteSongRepository {
  fn list_songs(&self) -> Result<Vec<SongWithOwner>, RepoError> {
    let mut conn = self.connection()?;

    let rows = tbl_songs::table
      .inner_join(tbl_users::table)
      .select((SongRow::as_select(), UserRow::as_select()))
      .order(tbl_songs::id.desc())
      .load::<(SongRow, UserRow)>(&mut conn)
      .map_err(storage_err)?;

    into_songs(rows)
  }

  fn get_song(&self, song_id: SongId) -> Result<Option<SongWithOwner>, RepoError> {
    let mut conn = self.connection()?;

    let row = tbl_songs::table
      .inner_join(tbl_users::table)
      .filter(tbl_songs::id.eq(song_id.get()))
      .select((SongRow::as_select(), UserRow::as_select()))
      .first::<(SongRow, UserRow)>(&mut conn)
      .optional()
      .map_err(storage_err)?;

    row.map(|r| row_to_song_with_owner(r).map_err(storage_err)).transpose()
  }

  fn search_songs(&self, term: &str) -> Result<Vec<SongWithOwner>, RepoError> {
    let pattern = contains_pattern(&term.to_lowercase());
    let mut conn = self.connection()?;

    let rows = tbl_songs::table
      .inner_join(tbl_users::table)
      .filter(
        fold_case(tbl_songs::title)
          .like(pattern.as_str())
          .escape('\\')
          .or(fold_case(tbl_songs::artist).like(pattern.as_str()).escape('\\'))
          .or(fold_case(tbl_songs::genre).like(pattern.as_str()).escape('\\')),
      )
      .select((SongRow::as_select(), UserRow::as_select()))
      .order(tbl_songs::id.desc())
      .load::<(SongRow, UserRow)>(&mut conn)
      .map_err(storage_err)?;

    debug!(term, matches = rows.len(), "song search");
    into_songs(rows)
  }

  fn insert_song(&self, song: &NewSong) -> Result<SongId, RepoError> {
    let row = NewSongRow::from_domain(song, Local::now().naive_local().trunc_subsecs(0));
    let owner = song.owner_id;
    let mut conn = self.connection()?;

    // IMMEDIATE so the owner check and the insert see the same snapshot under WAL
    let inserted = conn.immediate_transaction::<_, DieselError, _>(|conn| {
      let owner_exists =
        diesel::select(diesel::dsl::exists(tbl_users::table.filter(tbl_users::id.eq(owner.get()))))
          .get_result::<bool>(conn)?;
      if !owner_exists {
        return Ok(None);
      }

      diesel::insert_into(tbl_songs::table)
        .values(&row)
        .returning(tbl_songs::id)
        .get_result::<i32>(conn)
        .map(Some)
    });

    match inserted {
      Ok(Some(raw)) => {
        SongId::new(raw).ok_or_else(|| storage_err(format!("store returned non-positive id {raw}")))
      }
      Ok(None) | Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
        Err(RepoError::InvalidOwner(owner))
      }
      Err(e) => Err(storage_err(e)),
    }
  }

  fn update_song(&self, update: &SongUpdate) -> Result<(), RepoError> {
    let changes = SongChangesRow::from(&update.details);
    let (song_id, owner_id) = (update.id.get(), update.owner_id.get());

    self.guarded_write(update.id, |conn| {
      diesel::update(
        tbl_songs::table.filter(tbl_songs::id.eq(song_id)).filter(tbl_songs::user_id.eq(owner_id)),
      )
      .set(&changes)
      .execute(conn)
    })
  }

  fn delete_song(&self, id: SongId, owner_id: UserId) -> Result<(), RepoError> {
    let (song_id, owner_id) = (id.get(), owner_id.get());

    self.guarded_write(id, |conn| {
      diesel::delete(
        tbl_songs::table.filter(tbl_songs::id.eq(song_id)).filter(tbl_songs::user_id.eq(owner_id)),
      )
      .execute(conn)
    })
  }

  fn can_user_edit(&self, id: SongId, owner_id: UserId) -> Result<bool, RepoError> {
    let mut conn = self.connection()?;

    diesel::select(diesel::dsl::exists(
      tbl_songs::table.filter(tbl_songs::id.eq(id.get())).filter(tbl_songs::user_id.eq(owner_id.get())),
    ))
    .get_result::<bool>(&mut conn)
    .map_err(storage_err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pattern_wraps_and_escapes_wildcards() {
    assert_eq!(contains_pattern(""), "%%");
    assert_eq!(contains_pattern("rock"), "%rock%");
    assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
  }

  #[test]
  fn storage_errors_carry_the_message() {
    assert!(matches!(storage_err("disk full"), RepoError::Storage(msg) if msg == "disk full"));
  }
}
