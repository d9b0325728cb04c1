use diesel::prelude::*;
use songbook_config::LoggingConfig;
use songbook_core::domain::{NewSong, Rating, SongDetails, SongUpdate, UserId};
use songbook_core::services::CatalogService;
use songbook_storage::SqliteSongRepository;
use songbook_storage::models::NewUserRow;
use songbook_storage::schema::tbl_users;
use tracing_subscriber::EnvFilter;

fn main() {
  let logging = LoggingConfig::load().unwrap_or_default();
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
  tracing_subscriber::fmt().with_env_filter(filter).init();

  // uses [storage] from songbook.toml (SONGBOOK_BASE_DIR to point elsewhere)
  let store = SqliteSongRepository::new_from_config().expect("failed to open song store");

  {
    let mut conn = store.connection().expect("failed to get connection");
    for (id, username, full_name) in [(1, "smoke_owner", "Smoke Owner"), (2, "smoke_other", "Smoke Other")] {
      diesel::insert_or_ignore_into(tbl_users::table)
        .values(&NewUserRow { id, username, full_name, profile_image: None })
        .execute(&mut conn)
        .expect("failed to seed user");
    }
  }

  let catalog = CatalogService::new(store);
  let owner = UserId::new(1).expect("valid id");
  let other = UserId::new(2).expect("valid id");

  let details = SongDetails::new("Ode", "X", "Rock", "great", Rating::new(5).expect("valid rating"))
    .expect("valid details");

  let id = catalog.create_song(&NewSong::new(owner, details.clone())).expect("failed to create song");
  println!("Created song with id = {id}");

  let loaded = catalog.require_song(id).expect("failed to load song");
  println!("Loaded from DB: {loaded:?}");

  match catalog.update_song(&SongUpdate::new(id, other, details)) {
    Ok(()) => println!("Unexpected: user {other} edited song {id}"),
    Err(e) => println!("Update by user {other} rejected: {e}"),
  }

  let hits = catalog.search_songs("rock").expect("search failed");
  println!("Search \"rock\" -> {} hit(s)", hits.len());

  catalog.delete_song(id, owner).expect("failed to delete song");
  println!("Deleted song {id}; still present: {}", catalog.get_song(id).expect("lookup failed").is_some());
}
