//! Configuration management for LexCase Core

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment name ("development", "production", ...)
    pub environment: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// tracing filter directive, e.g. "info,lexcase_core=debug"
    pub filter: String,
    /// Emit JSON-formatted log lines instead of human-readable ones
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: env::var("LEXCASE_ENV").unwrap_or_else(|_| "development".to_string()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
                acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
            log: LogConfig {
                filter: env::var("LOG_FILTER").unwrap_or_else(|_| "info".to_string()),
                json: env::var("LOG_JSON")
                    .map(|s| s.to_lowercase() == "true")
                    .unwrap_or(false),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
