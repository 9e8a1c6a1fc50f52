//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which document database backs the app.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process tree, optionally seeded from a JSON export.
    Memory { seed_path: Option<PathBuf> },
    Postgres { database_url: String },
    Firebase { database_url: String, auth: Option<String> },
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub store: StoreBackend,
    pub local_store_path: PathBuf,
    pub confirmation_delay: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:8081".to_string());

        // --- Document Store ---
        let backend = var("STORE_BACKEND").unwrap_or_else(|| "memory".to_string());
        let store = match backend.to_lowercase().as_str() {
            "memory" => StoreBackend::Memory {
                seed_path: var("SEED_PATH").map(PathBuf::from),
            },
            "postgres" => StoreBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
            },
            "firebase" => StoreBackend::Firebase {
                database_url: var("FIREBASE_DATABASE_URL")
                    .ok_or_else(|| ConfigError::MissingVar("FIREBASE_DATABASE_URL".to_string()))?,
                auth: var("FIREBASE_AUTH"),
            },
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND".to_string(),
                    format!("'{}' is not one of memory, postgres, firebase", other),
                ))
            }
        };

        // --- Session and Checkout ---
        let local_store_path = var("LOCAL_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./session.json"));

        let confirmation_delay = match var("CONFIRMATION_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("CONFIRMATION_DELAY_MS".to_string(), e.to_string())
            })?),
            None => Duration::from_millis(1500),
        };

        Ok(Self {
            bind_address,
            log_level,
            store,
            local_store_path,
            confirmation_delay,
            cors_origin,
        })
    }
}
