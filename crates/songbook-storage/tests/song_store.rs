use std::sync::Arc;
use std::thread;

use diesel::prelude::*;
use tempfile::{TempDir, tempdir};

use songbook_core::domain::{NewSong, Rating, SongDetails, SongId, SongUpdate, UserId};
use songbook_core::ports::{RepoError, SongRepository};
use songbook_storage::models::NewUserRow;
use songbook_storage::schema::tbl_users;
use songbook_storage::{SqliteSongRepository, StorageConfig};

struct Fixture {
  store: SqliteSongRepository,
  _dir: TempDir,
}

fn fixture() -> Fixture {
  let dir = tempdir().unwrap();
  let mut cfg = StorageConfig::for_path(dir.path().join("songs.db"));
  cfg.pool_size = 2;
  let store = SqliteSongRepository::open(&cfg).unwrap();

  let mut conn = store.connection().unwrap();
  for (id, username, full_name, image) in [
    (1, "ana", "Ana Torres", Some("ana.png")),
    (2, "ben", "Ben Ortiz", None),
  ] {
    diesel::insert_into(tbl_users::table)
      .values(&NewUserRow { id, username, full_name, profile_image: image })
      .execute(&mut conn)
      .unwrap();
  }
  drop(conn);

  Fixture { store, _dir: dir }
}

fn user(id: i32) -> UserId {
  UserId::new(id).unwrap()
}

fn details(title: &str, artist: &str, genre: &str) -> SongDetails {
  SongDetails::new(title, artist, genre, "great", Rating::new(5).unwrap()).unwrap()
}

fn insert(store: &SqliteSongRepository, owner: i32, title: &str, artist: &str, genre: &str) -> SongId {
  store.insert_song(&NewSong::new(user(owner), details(title, artist, genre))).unwrap()
}

fn ids(songs: &[songbook_core::domain::SongWithOwner]) -> Vec<SongId> {
  songs.iter().map(|s| s.song.id).collect()
}

#[test]
fn ode_scenario() {
  let fx = fixture();
  let store = &fx.store;

  let id = insert(store, 1, "Ode", "X", "Rock");

  let stored = store.get_song(id).unwrap().expect("song just inserted");
  assert_eq!(stored.song.owner_id, user(1));
  assert_eq!(stored.song.title, "Ode");
  assert_eq!(stored.song.artist, "X");
  assert_eq!(stored.song.genre, "Rock");
  assert_eq!(stored.song.review, "great");
  assert_eq!(stored.song.rating.stars(), 5);
  assert_eq!(stored.owner.username, "ana");
  assert_eq!(stored.owner.profile_image.as_deref(), Some("ana.png"));

  let hijack = SongUpdate::new(id, user(2), details("Ode", "X", "Rock"));
  assert!(matches!(store.update_song(&hijack), Err(RepoError::NotOwner)));

  store.delete_song(id, user(1)).unwrap();
  assert!(store.get_song(id).unwrap().is_none());
}

#[test]
fn new_song_heads_the_list() {
  let fx = fixture();
  let first = insert(&fx.store, 1, "First", "A", "Jazz");
  let second = insert(&fx.store, 2, "Second", "B", "Pop");
  let third = insert(&fx.store, 1, "Third", "C", "Rock");

  let listed = fx.store.list_songs().unwrap();
  assert_eq!(ids(&listed), vec![third, second, first]);
  assert_eq!(listed[1].owner.full_name, "Ben Ortiz");
}

#[test]
fn missing_song_is_absent() {
  let fx = fixture();
  assert!(fx.store.get_song(SongId::new(404).unwrap()).unwrap().is_none());
  assert!(fx.store.list_songs().unwrap().is_empty());
}

#[test]
fn non_owner_update_leaves_song_unchanged() {
  let fx = fixture();
  let id = insert(&fx.store, 1, "Ode", "X", "Rock");
  let before = fx.store.get_song(id).unwrap().unwrap();

  let update = SongUpdate::new(id, user(2), details("Hijacked", "Y", "Metal"));
  assert!(matches!(fx.store.update_song(&update), Err(RepoError::NotOwner)));

  assert_eq!(fx.store.get_song(id).unwrap().unwrap(), before);
}

#[test]
fn owner_update_replaces_fields_but_keeps_owner_and_timestamp() {
  let fx = fixture();
  let id = insert(&fx.store, 1, "Ode", "X", "Rock");
  let before = fx.store.get_song(id).unwrap().unwrap();

  let new_details = SongDetails::new("Ode II", "X", "Folk", "even better", Rating::new(4).unwrap()).unwrap();
  fx.store.update_song(&SongUpdate::new(id, user(1), new_details)).unwrap();

  let after = fx.store.get_song(id).unwrap().unwrap();
  assert_eq!(after.song.title, "Ode II");
  assert_eq!(after.song.genre, "Folk");
  assert_eq!(after.song.review, "even better");
  assert_eq!(after.song.rating.stars(), 4);
  assert_eq!(after.song.owner_id, before.song.owner_id);
  assert_eq!(after.song.created_at, before.song.created_at);
}

#[test]
fn update_of_unknown_song_is_not_found() {
  let fx = fixture();
  let update = SongUpdate::new(SongId::new(77).unwrap(), user(1), details("Ode", "X", "Rock"));
  assert!(matches!(fx.store.update_song(&update), Err(RepoError::NotFound)));
}

#[test]
fn non_owner_delete_keeps_song() {
  let fx = fixture();
  let id = insert(&fx.store, 1, "Ode", "X", "Rock");

  assert!(matches!(fx.store.delete_song(id, user(2)), Err(RepoError::NotOwner)));
  assert!(fx.store.get_song(id).unwrap().is_some());

  assert!(matches!(fx.store.delete_song(SongId::new(999).unwrap(), user(1)), Err(RepoError::NotFound)));
}

#[test]
fn can_user_edit_matches_exact_pair() {
  let fx = fixture();
  let id = insert(&fx.store, 1, "Ode", "X", "Rock");

  assert!(fx.store.can_user_edit(id, user(1)).unwrap());
  assert!(!fx.store.can_user_edit(id, user(2)).unwrap());
  assert!(!fx.store.can_user_edit(SongId::new(999).unwrap(), user(1)).unwrap());

  fx.store.delete_song(id, user(1)).unwrap();
  assert!(!fx.store.can_user_edit(id, user(1)).unwrap());
}

#[test]
fn empty_search_equals_list() {
  let fx = fixture();
  insert(&fx.store, 1, "Ode", "X", "Rock");
  insert(&fx.store, 2, "Blue", "Y", "Jazz");

  let listed = fx.store.list_songs().unwrap();
  let searched = fx.store.search_songs("").unwrap();
  assert_eq!(searched, listed);
}

#[test]
fn search_matches_title_artist_or_genre_ignoring_case() {
  let fx = fixture();
  let rock = insert(&fx.store, 1, "Ode", "X", "Rock");
  let by_artist = insert(&fx.store, 2, "Blue", "The Rockers", "Jazz");
  let by_title = insert(&fx.store, 1, "Rock Lobster", "B-52s", "New Wave");
  insert(&fx.store, 2, "Calm", "Z", "Ambient");

  let found = fx.store.search_songs("rOcK").unwrap();
  assert_eq!(ids(&found), vec![by_title, by_artist, rock]);

  assert!(fx.store.search_songs("polka").unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
  let fx = fixture();
  let pure = insert(&fx.store, 1, "100% Pure", "X", "Rock");
  insert(&fx.store, 1, "Snake_Case Blues", "Y", "Blues");
  insert(&fx.store, 1, "Plain", "Z", "Pop");

  assert_eq!(ids(&fx.store.search_songs("%").unwrap()), vec![pure]);
  assert_eq!(fx.store.search_songs("_").unwrap().len(), 1);
}

#[test]
fn search_folds_case_beyond_ascii() {
  let fx = fixture();
  let ace = insert(&fx.store, 1, "Ace of Spades", "Motörhead", "Metal");
  let ete = insert(&fx.store, 2, "Été", "Beyoncé", "Música Pop");
  insert(&fx.store, 1, "Plain", "Z", "Pop");

  assert_eq!(ids(&fx.store.search_songs("MOTÖRHEAD").unwrap()), vec![ace]);
  assert_eq!(ids(&fx.store.search_songs("motörhead").unwrap()), vec![ace]);
  assert_eq!(ids(&fx.store.search_songs("BEYONCÉ").unwrap()), vec![ete]);
  assert_eq!(ids(&fx.store.search_songs("été").unwrap()), vec![ete]);
  assert_eq!(ids(&fx.store.search_songs("MÚSICA").unwrap()), vec![ete]);
}

#[test]
fn search_ignores_review_text() {
  let fx = fixture();
  let reviewed =
    SongDetails::new("Blue in Green", "Bill Evans", "Ballad", "the best jazz record", Rating::new(5).unwrap())
      .unwrap();
  fx.store.insert_song(&NewSong::new(user(1), reviewed)).unwrap();
  let jazz = insert(&fx.store, 2, "So What", "Miles Davis", "Jazz");

  assert_eq!(ids(&fx.store.search_songs("jazz").unwrap()), vec![jazz]);
  assert!(fx.store.search_songs("record").unwrap().is_empty());
}

#[test]
fn insert_with_unknown_owner_is_rejected() {
  let fx = fixture();
  let song = NewSong::new(user(42), details("Ode", "X", "Rock"));

  assert!(matches!(fx.store.insert_song(&song), Err(RepoError::InvalidOwner(owner)) if owner == user(42)));
  assert!(fx.store.list_songs().unwrap().is_empty());
}

#[test]
fn store_is_shared_across_threads() {
  let fx = fixture();
  let store = Arc::new(fx.store);

  let handles: Vec<_> = (0..4)
    .map(|n| {
      let store = Arc::clone(&store);
      thread::spawn(move || {
        for i in 0..5 {
          insert(&store, 1 + n % 2, &format!("Song {n}-{i}"), "Band", "Rock");
        }
      })
    })
    .collect();

  for handle in handles {
    handle.join().unwrap();
  }

  let listed = store.list_songs().unwrap();
  assert_eq!(listed.len(), 20);
  assert!(listed.windows(2).all(|w| w[0].song.id > w[1].song.id));
}

#[test]
fn reopening_keeps_data() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("songs.db");

  let store = SqliteSongRepository::new(path.to_str().unwrap()).unwrap();
  let mut conn = store.connection().unwrap();
  diesel::insert_into(tbl_users::table)
    .values(&NewUserRow { id: 1, username: "ana", full_name: "Ana Torres", profile_image: None })
    .execute(&mut conn)
    .unwrap();
  drop(conn);
  let id = insert(&store, 1, "Ode", "X", "Rock");
  drop(store);

  let reopened = SqliteSongRepository::new(path.to_str().unwrap()).unwrap();
  assert_eq!(reopened.get_song(id).unwrap().unwrap().song.title, "Ode");
}
