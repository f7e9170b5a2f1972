use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::storage::{DEFAULT_FILENAME, StoreConfig};

pub const DEFAULT_PORT: u16 = 3333;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_directory: PathBuf,
    pub db_filename: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            db_directory: PathBuf::from("."),
            db_filename: DEFAULT_FILENAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("APP_HOST").unwrap_or(defaults.host);

        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .context("APP_PORT must be a valid u16")?,
            None => defaults.port,
        };

        let db_directory = lookup("DB_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_directory);
        let db_filename = lookup("DB_FILENAME").unwrap_or(defaults.db_filename);

        Ok(Self {
            host,
            port,
            db_directory,
            db_filename,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.db_directory.clone(), self.db_filename.clone())
    }
}
