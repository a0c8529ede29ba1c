//! Configuration loading and persistence.
//!
//! The config lives at `~/.chronicle/config.toml` (or under
//! `CHRONICLE_DATA_DIR`). A missing file is created with defaults on first
//! load. Dotted-key get/set operates on the raw TOML tree so the CLI can
//! read and write any field without a per-key match.

use std::path::{Path, PathBuf};

use chronicle_types::config::GlobalConfig;
use chronicle_types::error::ConfigError;

/// Directory holding the config file, database, and session transcripts.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHRONICLE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chronicle")
}

/// On-disk TOML config store.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location (`<data_dir>/config.toml`).
    pub fn open_default() -> Self {
        Self::new(data_dir().join("config.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, creating a default file when none exists.
    pub fn load(&self) -> Result<GlobalConfig, ConfigError> {
        if !self.path.exists() {
            let config = GlobalConfig::default();
            self.save(&config)?;
            tracing::info!(path = %self.path.display(), "created default config");
            return Ok(config);
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn save(&self, config: &GlobalConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let raw = toml::to_string_pretty(config).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Read one value by dotted key (e.g. `summarizer.max_retries`).
    pub fn get_value(&self, key: &str) -> Result<Option<toml::Value>, ConfigError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Io(e.to_string())),
        };
        let root: toml::Value = toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut current = &root;
        for part in key.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current.clone()))
    }

    /// Set one value by dotted key, creating intermediate tables as needed.
    ///
    /// The value string is interpreted as TOML when possible (numbers,
    /// booleans) and falls back to a plain string. The result must still
    /// deserialize as a valid config or the write is rejected.
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(&self.path).unwrap_or_default();
        let mut root: toml::Value = if raw.is_empty() {
            toml::Value::Table(toml::map::Map::new())
        } else {
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
        };

        let parsed: toml::Value = value
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| value.parse::<bool>().map(toml::Value::Boolean))
            .or_else(|_| value.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(value.to_string()));

        let mut current = &mut root;
        let parts: Vec<&str> = key.split('.').collect();
        for part in &parts[..parts.len() - 1] {
            let table = current
                .as_table_mut()
                .ok_or_else(|| ConfigError::Parse(format!("'{part}' is not a table")))?;
            current = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }
        let leaf = parts.last().expect("split yields at least one part");
        current
            .as_table_mut()
            .ok_or_else(|| ConfigError::Parse(format!("'{key}' parent is not a table")))?
            .insert(leaf.to_string(), parsed);

        // Reject writes that would corrupt the typed config.
        let serialized =
            toml::to_string_pretty(&root).map_err(|e| ConfigError::Parse(e.to_string()))?;
        toml::from_str::<GlobalConfig>(&serialized)
            .map_err(|e| ConfigError::Parse(format!("'{key}' would make the config invalid: {e}")))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(&self.path, serialized).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_types::config::ProviderKind;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let store = ConfigStore::new(path);
        (dir, store)
    }

    #[test]
    fn test_load_creates_default_file() {
        let (_dir, store) = store();
        assert!(!store.path().exists());

        let config = store.load().unwrap();
        assert!(store.path().exists());
        assert_eq!(config.provider, ProviderKind::Gemini);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (_dir, store) = store();
        let mut config = GlobalConfig::default();
        config.add_repository("/work/project");
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.repositories, vec!["/work/project"]);
    }

    #[test]
    fn test_get_and_set_dotted_keys() {
        let (_dir, store) = store();
        store.load().unwrap();

        store.set_value("summarizer.max_retries", "3").unwrap();
        let value = store.get_value("summarizer.max_retries").unwrap().unwrap();
        assert_eq!(value.as_integer(), Some(3));

        store.set_value("provider", "ollama").unwrap();
        let config = store.load().unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.summarizer.max_retries, 3);
    }

    #[test]
    fn test_set_rejects_invalid_config() {
        let (_dir, store) = store();
        store.load().unwrap();

        let err = store.set_value("provider", "not-a-provider").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        // The original value survives a rejected write.
        let config = store.load().unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let (_dir, store) = store();
        store.load().unwrap();
        assert!(store.get_value("no.such.key").unwrap().is_none());
    }
}
