use crate::io::atomic_write_str;
use crate::paths::{ConfigError, SongbookPaths};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

// toml_edit is used for writes so user comments survive
use toml_edit::{DocumentMut, Item};

pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

pub struct TomlConfigBackend {
  paths: SongbookPaths,
}

impl TomlConfigBackend {
  pub fn new(paths: SongbookPaths) -> Self {
    Self { paths }
  }

  /// Like [`ConfigBackend::load_section`], but a missing file or section yields `T::default()`.
  pub fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    use std::io::ErrorKind;

    let path = self.paths.config_file();
    let content = match fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Ok(T::default());
      }
      Err(e) => return Err(e.into()),
    };

    let toml_val: toml::Value = toml::from_str(&content)?;

    let Some(table) = toml_val.get(section) else {
      return Ok(T::default());
    };

    decode_section(section, table.clone())
  }

  /// Loads a section (or its default) and writes it back, so the file always
  /// lists every known key.
  pub fn load_or_init_section<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Serialize + Default,
  {
    let cfg = self.load_section_with_default(section)?;
    self.save_section(section, &cfg)?;
    Ok(cfg)
  }
}

fn decode_section<T: DeserializeOwned>(section: &str, table: toml::Value) -> Result<T, ConfigError> {
  table.try_into().map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.paths.config_file();
    let content = fs::read_to_string(&path)?;
    let toml_val: toml::Value = toml::from_str(&content)?;

    let table = toml_val
      .get(section)
      .ok_or_else(|| ConfigError::Other(format!("missing section [{section}] in {:?}", path)))?;

    decode_section(section, table.clone())
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    use std::io::ErrorKind;

    let path = self.paths.config_file();

    let mut doc: DocumentMut = match fs::read_to_string(&path) {
      Ok(content) => content
        .parse::<DocumentMut>()
        .map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?,
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    // `toml::to_string` yields the section body without a header ("foo = 1\nbar = 2\n"),
    // which parses as a root table we can graft under `section`.
    let section_str = toml::to_string(value)
      .map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;

    let section_doc = section_str
      .parse::<DocumentMut>()
      .map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?;

    doc[section] = Item::Table(section_doc.as_table().clone());

    atomic_write_str(&path, &doc.to_string())?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use tempfile::tempdir;

  #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
  struct Sample {
    name: String,
    size: u32,
  }

  fn backend(base: &std::path::Path) -> TomlConfigBackend {
    TomlConfigBackend::new(SongbookPaths::at(base).unwrap())
  }

  #[test]
  fn missing_file_yields_default() {
    let tmp = tempdir().unwrap();
    let cfg: Sample = backend(tmp.path()).load_section_with_default("sample").unwrap();
    assert_eq!(cfg, Sample::default());
  }

  #[test]
  fn save_then_load_keeps_other_sections_and_comments() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    let path = SongbookPaths::at(tmp.path()).unwrap().config_file();
    fs::write(&path, "# keep me\n[other]\nflag = true\n").unwrap();

    let value = Sample { name: "catalog".into(), size: 3 };
    backend.save_section("sample", &value).unwrap();

    let loaded: Sample = backend.load_section("sample").unwrap();
    assert_eq!(loaded, value);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("# keep me"));
    assert!(raw.contains("flag = true"));
  }

  #[test]
  fn load_section_reports_missing_section() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());
    backend.save_section("present", &Sample::default()).unwrap();

    let err = backend.load_section::<Sample>("absent").unwrap_err();
    assert!(matches!(err, ConfigError::Other(msg) if msg.contains("[absent]")));
  }

  #[test]
  fn load_or_init_writes_defaults() {
    let tmp = tempdir().unwrap();
    let backend = backend(tmp.path());

    let cfg: Sample = backend.load_or_init_section("sample").unwrap();
    assert_eq!(cfg, Sample::default());

    let again: Sample = backend.load_section("sample").unwrap();
    assert_eq!(again, Sample::default());
  }
}
