//! Notebook configuration.
//!
//! Locates the `SQLite` database and the managed storage root. Values come
//! from the environment, a JSON file, or are set programmatically.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::env_path;
use crate::{Error, Result};

/// Environment variable holding the database file path.
pub const DB_PATH_ENV: &str = "NPAD_DB_PATH";
/// Environment variable holding the managed storage root.
pub const STORAGE_ROOT_ENV: &str = "NPAD_STORAGE_ROOT";
/// Environment variable holding the base directory for source paths.
pub const SOURCE_ROOT_ENV: &str = "NPAD_SOURCE_ROOT";

/// Locations used by a [`crate::services::NotebookService`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NotebookConfig {
    /// `SQLite` database file. `None` keeps the database in memory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Directory tree that receives attachment copies.
    pub storage_root: PathBuf,
    /// Sources under this directory are stored relative to it.
    #[serde(default)]
    pub source_root: Option<PathBuf>,
}

impl NotebookConfig {
    /// Config with an on-disk database and a storage root.
    pub fn new(database_path: impl Into<PathBuf>, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            database_path: Some(database_path.into()),
            storage_root: storage_root.into(),
            source_root: None,
        }
    }

    /// Config with an in-memory database.
    pub fn in_memory(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            database_path: None,
            storage_root: storage_root.into(),
            source_root: None,
        }
    }

    /// Set the base directory for source paths.
    #[must_use]
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }

    /// Build a config from `NPAD_*` environment variables.
    ///
    /// `NPAD_STORAGE_ROOT` is required; blank values count as unset.
    pub fn from_env() -> Result<Self> {
        let storage_root = env_path(STORAGE_ROOT_ENV)
            .ok_or_else(|| Error::Config(format!("{STORAGE_ROOT_ENV} is not set")))?;

        Ok(Self {
            database_path: env_path(DB_PATH_ENV),
            storage_root,
            source_root: env_path(SOURCE_ROOT_ENV),
        })
    }

    /// Override fields from `NPAD_*` environment variables that are set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = env_path(DB_PATH_ENV) {
            self.database_path = Some(path);
        }
        if let Some(path) = env_path(STORAGE_ROOT_ENV) {
            self.storage_root = path;
        }
        if let Some(path) = env_path(SOURCE_ROOT_ENV) {
            self.source_root = Some(path);
        }
        self
    }

    /// Parse a config from JSON.
    pub fn from_json_str(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let payload = std::fs::read_to_string(path.as_ref()).map_err(|error| {
            Error::Config(format!(
                "cannot read config file {}: {error}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&payload)
    }

    fn validate(self) -> Result<Self> {
        if self.storage_root.as_os_str().is_empty() {
            return Err(Error::Config("storage_root must not be empty".to_string()));
        }
        if self
            .database_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(Error::Config("database_path must not be empty".to_string()));
        }
        Ok(self)
    }
}
