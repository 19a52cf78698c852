use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptoriumError};

/// Root application configuration, loaded from `~/.config/scriptorium/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub ingest: IngestConfig,
    pub dedup: DedupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub library_path: String,
}

/// Bounds for the leading-text scan performed on every ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_pages: usize,
    pub max_chars: usize,
    pub recursive_import: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub default_threshold: f64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("scriptorium");

        Self {
            library_path: data_dir.to_string_lossy().to_string(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_pages: 2,
            max_chars: 20_000,
            recursive_import: false,
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.85,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/scriptorium/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SCRIPTORIUM_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("scriptorium")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.dedup.default_threshold) {
            return Err(ScriptoriumError::ConfigError(format!(
                "dedup.default_threshold must be between 0 and 1, got {}",
                self.dedup.default_threshold
            )));
        }
        if self.ingest.max_pages == 0 {
            return Err(ScriptoriumError::ConfigError(
                "ingest.max_pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_library_path(&mut self, path: PathBuf) {
        self.core.library_path = path.to_string_lossy().to_string();
    }

    // ─── Derived paths ─────────────────────────────────────

    pub fn library_path(&self) -> PathBuf {
        PathBuf::from(&self.core.library_path)
    }

    /// Path to the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.library_path().join("db").join("scriptorium.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ingest.max_pages, 2);
        assert_eq!(cfg.ingest.max_chars, 20_000);
        assert_eq!(cfg.dedup.default_threshold, 0.85);
        assert!(!cfg.core.library_path.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.ingest.max_pages = 3;
        cfg.dedup.default_threshold = 0.9;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ingest.max_pages, 3);
        assert_eq!(loaded.dedup.default_threshold, 0.9);
        assert_eq!(loaded.core.library_path, cfg.core.library_path);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[dedup]\ndefault_threshold = 0.7\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.dedup.default_threshold, 0.7);
        assert_eq!(loaded.ingest.max_chars, 20_000);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[dedup]\ndefault_threshold = 1.5\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ScriptoriumError::ConfigError(_)));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.ingest.max_pages, 2);
    }

    #[test]
    fn test_derived_paths() {
        let mut cfg = AppConfig::default();
        cfg.set_library_path(PathBuf::from("/tmp/lib"));
        assert_eq!(cfg.database_path(), PathBuf::from("/tmp/lib/db/scriptorium.db"));
    }
}
