//! Configuration service implementation.
//!
//! Loads the root configuration from the configuration file
//! (`~/.config/kaiwa/config.toml`), creating it with defaults when missing,
//! and caches the result to avoid repeated file I/O.

use crate::paths::KaiwaPaths;
use kaiwa_core::config::RootConfig;
use kaiwa_core::error::{KaiwaError, Result};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
    /// Explicit config file path override (used by tests).
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Creates a new ConfigService over the default config location.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            path: None,
        }
    }

    /// Creates a service reading from an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            path: Some(path),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// Falls back to `RootConfig::default()` when the file cannot be loaded;
    /// the cause is logged.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                RootConfig::default()
            }
        };

        {
            let mut write_lock = self.config.write().unwrap();
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap();
        *write_lock = None;
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => KaiwaPaths::config_file().map_err(|e| KaiwaError::config(e.to_string())),
        }
    }

    /// Loads RootConfig from the config file, writing defaults when the file
    /// does not exist yet.
    fn load_config(&self) -> Result<RootConfig> {
        let config_path = self.config_path()?;

        if !config_path.exists() {
            let default_config = RootConfig::default();
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&config_path, toml::to_string_pretty(&default_config)?)?;
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_default_config_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let service = ConfigService::with_path(path.clone());

        let config = service.get_config();
        assert_eq!(config, RootConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_loads_existing_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "model = \"mistral\"\nendpoint = \"http://localhost:11434\"\nstreaming = false\n",
        )
        .unwrap();

        let service = ConfigService::with_path(path);
        let config = service.get_config();
        assert_eq!(config.model, "mistral");
        assert!(!config.streaming);
        // Unspecified keys take their defaults.
        assert_eq!(config.alt_model, "qwen2.5-coder");
    }

    #[test]
    fn test_cache_and_invalidate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "model = \"mistral\"\n").unwrap();

        let service = ConfigService::with_path(path.clone());
        assert_eq!(service.get_config().model, "mistral");

        std::fs::write(&path, "model = \"llama3\"\n").unwrap();
        // Cached value until invalidated.
        assert_eq!(service.get_config().model, "mistral");
        service.invalidate_cache();
        assert_eq!(service.get_config().model, "llama3");
    }
}
