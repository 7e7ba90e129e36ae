//! Persisted defaults, currently just the printer's Bluetooth address.
//!
//! Stored as JSON under `$XDG_CONFIG_HOME/pt710bt/config.json` (falling back
//! to `~/.config`). A missing file reads as empty defaults; anything else
//! that goes wrong is a configuration error surfaced before any device I/O.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_DIR: &str = "pt710bt";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub bt_address: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn store(&self) -> Result<()> {
        self.store_to(&config_path()?)
    }

    fn load_from(path: &PathBuf) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(Error::Config(format!("{}: {e}", path.display()))),
        }
    }

    fn store_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::Config(format!("{}: {e}", dir.display())))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

/// Stored default Bluetooth address, if any.
pub fn default_address() -> Result<Option<String>> {
    Ok(Config::load()?.bt_address)
}

/// Persist `address` as the default for future runs.
pub fn set_default_address(address: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.bt_address = Some(address.to_string());
    config.store()
}

fn config_path() -> Result<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home = std::env::var_os("HOME")
                .ok_or_else(|| Error::Config("HOME is not set".to_string()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(base.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pt710bt-config-test-{}-{name}", std::process::id()))
            .join(CONFIG_FILE)
    }

    #[test]
    fn missing_file_reads_as_defaults() {
        let config = Config::load_from(&temp_path("missing")).unwrap();
        assert_eq!(config.bt_address, None);
    }

    #[test]
    fn round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let config = Config {
            bt_address: Some("EC:79:49:63:2A:80".to_string()),
        };
        config.store_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.bt_address.as_deref(), Some("EC:79:49:63:2A:80"));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
