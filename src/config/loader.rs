//! Configuration Loader
//!
//! Handles loading and merging provider configurations from multiple sources.

use crate::config::provider::{ProviderConfig, ProvidersConfig};
use crate::error::{RelayError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    config: ProvidersConfig,
}

impl ConfigLoader {
    /// Create a new config loader and load from default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self {
            config: ProvidersConfig::default(),
        };

        // Load built-in defaults first
        loader.load_builtin_defaults()?;

        // Then load from file system (can override built-ins)
        loader.load_from_default_paths()?;

        loader.config.validate()?;
        Ok(loader)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self {
            config: ProvidersConfig::default(),
        };

        loader.load_builtin_defaults()?;
        loader.load_from_file(path)?;

        loader.config.validate()?;
        Ok(loader)
    }

    /// Load built-in provider defaults
    fn load_builtin_defaults(&mut self) -> Result<()> {
        let defaults = include_str!("../../providers.json");
        let config: ProvidersConfig = serde_json::from_str(defaults).map_err(|e| {
            RelayError::Config(format!("Failed to parse built-in providers.json: {}", e))
        })?;

        self.merge_config(config);
        Ok(())
    }

    /// Load configuration from default paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Get list of config paths to check
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("polyrelay").join("providers.json"));
        }

        // 2. Current directory
        paths.push(PathBuf::from("providers.json"));

        // 3. Environment variable
        if let Ok(custom_path) = std::env::var("POLYRELAY_PROVIDERS_PATH") {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: ProvidersConfig = serde_json::from_str(&content).map_err(|e| {
            RelayError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "loaded provider config");
        self.merge_config(config);
        Ok(())
    }

    /// Merge another config into this one; same-named providers are replaced in place
    fn merge_config(&mut self, other: ProvidersConfig) {
        merge_list(&mut self.config.chat, other.chat);
        merge_list(&mut self.config.images, other.images);
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ProvidersConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> ProvidersConfig {
        self.config
    }
}

fn merge_list(base: &mut Vec<ProviderConfig>, other: Vec<ProviderConfig>) {
    for provider in other {
        match base.iter_mut().find(|p| p.name == provider.name) {
            Some(existing) => *existing = provider,
            None => base.push(provider),
        }
    }
}
