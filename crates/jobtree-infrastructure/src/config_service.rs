//! Configuration service implementation.
//!
//! Loads [`ConfigRoot`] from `config.toml` (`~/.config/jobtree/config.toml`
//! by default) and caches it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use jobtree_core::Result;
use jobtree_core::config::ConfigRoot;

use crate::paths::JobtreePaths;

/// Loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ConfigRoot>>>,
}

impl ConfigService {
    /// Uses the platform config location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(JobtreePaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it on first access.
    ///
    /// A missing file yields the defaults; a malformed or invalid one is an
    /// error.
    pub fn get_config(&self) -> Result<ConfigRoot> {
        if let Some(cached) = self.config.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.load()?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn load(&self) -> Result<ConfigRoot> {
        if !self.path.exists() {
            tracing::debug!("[ConfigService] {} not found, using defaults", self.path.display());
            return Ok(ConfigRoot::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let config = ConfigRoot::from_toml_str(&content)?;
        tracing::info!("[ConfigService] loaded {}", self.path.display());
        Ok(config)
    }
}
