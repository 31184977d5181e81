//! Application settings.
//!
//! Sources, lowest precedence first:
//!
//! - built-in defaults (sqlite backend, `movimientos.csv`, `movimientos.db`, `info`)
//! - an optional `kakebo.toml` in the working directory
//! - `KAKEBO_*` environment variables (`KAKEBO_BACKEND`, `KAKEBO_CSV_PATH`,
//!   `KAKEBO_DB_PATH`, `KAKEBO_LOG_LEVEL`)
//!
//! Store paths are passed explicitly to the store constructors.
use crate::csv_store::CsvStore;
use crate::db::SqliteStore;
use crate::error::StoreResult;
use crate::store::MovementStore;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub backend: Backend,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
}

impl Settings {
    /// Defaults, then `kakebo.toml` if present, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("kakebo").required(false))
            .add_source(Environment::with_prefix("KAKEBO"))
            .build()?
            .try_deserialize()
    }

    /// Defaults overridden by the given file only
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("backend", "sqlite")?
            .set_default("csv_path", "movimientos.csv")?
            .set_default("db_path", "movimientos.db")?
            .set_default("log_level", "info")
    }

    /// Open the configured store behind the persistence boundary
    pub fn open_store(&self) -> StoreResult<Box<dyn MovementStore>> {
        Ok(match self.backend {
            Backend::Csv => Box::new(CsvStore::open(&self.csv_path)?),
            Backend::Sqlite => Box::new(SqliteStore::open(&self.db_path)?),
        })
    }
}
