//! Configuration management for dejavue.
//!
//! The configuration is a small JSON document stored next to the database in
//! the platform data directory. Today it only carries database settings;
//! every section is optional so older files keep parsing as sections are
//! added.
//!
//! ## Resolution Order
//!
//! The database path is resolved as follows:
//! 1. `DEJAVUE_DB_PATH` environment variable (a `.env` file is honoured)
//! 2. `database.path` from `config.json`
//! 3. `dejavue.db` inside the data directory
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dejavue::libs::config::Config;
//!
//! let config = Config::read()?;
//! let db_path = config.database_path()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error_anyhow};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default database file name inside the data directory.
pub const DB_FILE_NAME: &str = "dejavue.db";

/// Environment variable that overrides the configured database path.
pub const DB_PATH_ENV: &str = "DEJAVUE_DB_PATH";

/// Database connection settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct DatabaseConfig {
    /// Explicit SQLite file location. When absent the data directory is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Milliseconds SQLite waits on a locked database before giving up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,
}

/// Root configuration document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
}

impl Config {
    /// Reads the configuration from the platform data directory.
    ///
    /// A missing file yields the default configuration.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    /// Reads the configuration from an explicit file.
    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            msg_debug!(Message::ConfigFileNotFound);
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        serde_json::from_str(&config_str).map_err(|e| msg_error_anyhow!(format!("{}: {}", Message::ConfigParseError, e)))
    }

    /// Writes the configuration to the platform data directory.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    /// Writes the configuration as pretty-printed JSON to an explicit file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file from the data directory, if present.
    pub fn delete() -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if config_file_path.exists() {
            fs::remove_file(config_file_path)?;
        }
        Ok(())
    }

    /// Resolves the SQLite file to open.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.trim().is_empty() {
                msg_debug!(Message::DatabasePathOverride(path.clone()));
                return Ok(PathBuf::from(path));
            }
        }

        match self.database.as_ref().and_then(|db| db.path.clone()) {
            Some(path) => Ok(path),
            None => DataStorage::new().get_path(DB_FILE_NAME),
        }
    }

    /// Busy timeout for new connections, defaulting to five seconds.
    pub fn busy_timeout_ms(&self) -> u64 {
        self.database.as_ref().and_then(|db| db.busy_timeout_ms).unwrap_or(5_000)
    }
}
