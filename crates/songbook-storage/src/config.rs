use songbook_config::{CONFIG_BACKEND, ConfigBackend, ConfigError, PATHS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

/// `[storage]` section of songbook.toml.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
  pub db_path: PathBuf,
  pub journal_mode: Option<String>,
  /// Maximum number of pooled SQLite connections.
  #[serde(default = "default_pool_size")]
  pub pool_size: u32,
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u32,
}

fn default_pool_size() -> u32 {
  4
}

fn default_busy_timeout_ms() -> u32 {
  5_000
}

impl Default for StorageConfig {
  fn default() -> Self {
    let db_path = PATHS.data_dir.join("songbook.db");
    StorageConfig {
      db_path,
      journal_mode: Some("WAL".to_string()),
      pool_size: default_pool_size(),
      busy_timeout_ms: default_busy_timeout_ms(),
    }
  }
}

impl StorageConfig {
  /// Config for a database file at `db_path`, other settings at their defaults.
  pub fn for_path(db_path: impl Into<PathBuf>) -> Self {
    StorageConfig {
      db_path: db_path.into(),
      journal_mode: Some("WAL".to_string()),
      pool_size: default_pool_size(),
      busy_timeout_ms: default_busy_timeout_ms(),
    }
  }

  pub fn load() -> Result<Self, ConfigError> {
    CONFIG_BACKEND.load_or_init_section("storage")
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("storage", self)
  }

  /// Normalized journal mode, or an error if it is not one SQLite knows.
  pub fn normalized_journal_mode(&self) -> Result<Option<String>, ConfigError> {
    match &self.journal_mode {
      None => Ok(None),
      Some(mode) => {
        let upper = mode.trim().to_ascii_uppercase();
        if JOURNAL_MODES.contains(&upper.as_str()) {
          Ok(Some(upper))
        } else {
          Err(ConfigError::Other(format!("unknown journal_mode `{mode}`")))
        }
      }
    }
  }
}
