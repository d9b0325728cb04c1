use crate::paths::ConfigError;
use crate::{CONFIG_BACKEND, ConfigBackend};
use serde::{Deserialize, Serialize};

/// `[logging]` section of songbook.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
  /// `tracing` filter directive, used when `RUST_LOG` is not set.
  #[serde(default = "default_filter")]
  pub filter: String,
}

fn default_filter() -> String {
  "info".to_string()
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self { filter: default_filter() }
  }
}

impl LoggingConfig {
  pub fn load() -> Result<Self, ConfigError> {
    CONFIG_BACKEND.load_or_init_section("logging")
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("logging", self)
  }
}
