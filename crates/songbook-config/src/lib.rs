mod backend;
mod io;
mod logging;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use io::atomic_write_str;
pub use logging::LoggingConfig;
pub use paths::{ConfigError, SongbookPaths};

use once_cell::sync::Lazy;

// Paths singleton (SONGBOOK_BASE_DIR override or system dirs)
pub static PATHS: Lazy<SongbookPaths> =
  Lazy::new(|| SongbookPaths::detect().expect("failed to init SongbookPaths"));

// Config backend singleton
pub static CONFIG_BACKEND: Lazy<TomlConfigBackend> = Lazy::new(|| TomlConfigBackend::new(PATHS.clone()));
