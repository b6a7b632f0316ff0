//! Run configuration: service endpoint and credentials, catalog storage and
//! the local source.
//!
//! Loaded from a JSON file; every field has a default so partial files work.
//! The password may come from the `MINGEST_PASSWORD` environment variable
//! instead of the file.

use crate::catalog::memory::DEFAULT_REMOTE_BASE;
use crate::models::Source;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `service.password`.
pub const PASSWORD_ENV: &str = "MINGEST_PASSWORD";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: PathBuf,
    /// Delete the catalog storage once a workflow finishes.
    pub discard_on_exit: bool,
    /// Url prefix for sizes published by the in-process uploader.
    pub remote_base: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("media-catalog.parquet"),
            discard_on_exit: false,
            remote_base: DEFAULT_REMOTE_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub catalog: CatalogConfig,
    pub source: Source,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            catalog: CatalogConfig::default(),
            source: Source::new("desktop", "local")
                .with_title("Desktop", "")
                .with_category("computer"),
        }
    }
}

impl Config {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("Invalid configuration: {e}")))
    }

    /// Read and parse a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults, then apply the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(password) = std::env::var(PASSWORD_ENV)
            && !password.is_empty()
        {
            self.service.password = password;
        }
    }

    /// Check the settings needed for local ingestion.
    pub fn validate_local(&self) -> Result<()> {
        if self.catalog.path.as_os_str().is_empty() {
            return Err(Error::InvalidInput("catalog.path must not be empty".to_string()));
        }
        if self.source.source_type.is_empty() || self.source.handle.is_empty() {
            return Err(Error::InvalidInput(
                "source.type and source.handle must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Check everything, including what the remote workflows need.
    pub fn validate(&self) -> Result<()> {
        self.validate_local()?;
        if self.service.base_url.is_empty() {
            return Err(Error::InvalidInput("service.base_url must not be empty".to_string()));
        }
        if self.service.email.is_empty() || self.service.password.is_empty() {
            return Err(Error::InvalidInput(format!(
                "service.email and service.password (or {PASSWORD_ENV}) are required"
            )));
        }
        Ok(())
    }
}
