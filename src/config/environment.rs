// ABOUTME: Environment-based configuration loading for the program engine
// ABOUTME: Reads and validates server, database, and generation settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::types::{Environment, GenerationStrategy, LogLevel};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Strongly typed database URL configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to the `SQLite` database file
        path: String,
    },
    /// In-memory `SQLite` database (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse database URL from string
    #[must_use]
    pub fn parse_url(url: &str) -> Self {
        if url == "sqlite::memory:" || url == ":memory:" {
            Self::Memory
        } else if let Some(path) = url.strip_prefix("sqlite:") {
            Self::SQLite {
                path: path.to_owned(),
            }
        } else {
            // Assume it's a file path for SQLite
            Self::SQLite {
                path: url.to_owned(),
            }
        }
    }

    /// Convert back to URL string for database connections
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{path}"),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: "./data/programs.db".to_owned(),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: DatabaseUrl,
    /// Run schema migrations automatically on startup
    pub auto_migrate: bool,
}

/// Program generation tuning knobs
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Strategy serving non-streaming generation requests
    pub strategy: GenerationStrategy,
    /// Maximum completion tokens requested from the LLM per call
    pub max_tokens: u32,
    /// Sampling temperature for generation calls
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            strategy: GenerationStrategy::Sequential,
            max_tokens: 8192,
            temperature: 0.7,
        }
    }
}

/// HTTP surface configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Port for the HTTP API
    pub port: u16,
    /// Allowed CORS origins ("*" permits any origin)
    pub cors_origins: Vec<String>,
}

/// Complete server configuration loaded from environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP surface settings
    pub http: HttpConfig,
    /// Log level for the service
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Generation tuning knobs
    pub generation: GenerationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a present environment variable fails to parse
    /// or if the resulting configuration fails validation.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (ignore errors if file doesn't exist)
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }

        let config = Self {
            http: HttpConfig {
                port: env_var_or("HTTP_PORT", "8081")
                    .parse()
                    .context("Invalid HTTP_PORT value")?,
                cors_origins: env_var_or("CORS_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", "sqlite:./data/programs.db")),
                auto_migrate: env_var_or("AUTO_MIGRATE", "true")
                    .parse()
                    .context("Invalid AUTO_MIGRATE value")?,
            },
            generation: GenerationConfig {
                strategy: GenerationStrategy::from_str_or_default(&env_var_or(
                    "GENERATION_STRATEGY",
                    "sequential",
                )),
                max_tokens: env_var_or("GENERATION_MAX_TOKENS", "8192")
                    .parse()
                    .context("Invalid GENERATION_MAX_TOKENS value")?,
                temperature: env_var_or("GENERATION_TEMPERATURE", "0.7")
                    .parse()
                    .context("Invalid GENERATION_TEMPERATURE value")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for consistency
    ///
    /// # Errors
    ///
    /// Returns an error when a value is outside its supported range.
    pub fn validate(&self) -> Result<()> {
        if self.http.port == 0 {
            anyhow::bail!("HTTP_PORT must be non-zero");
        }
        if self.generation.max_tokens == 0 {
            anyhow::bail!("GENERATION_MAX_TOKENS must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            anyhow::bail!("GENERATION_TEMPERATURE must be between 0.0 and 2.0");
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Pierre Program Engine Configuration:\n\
             - HTTP port: {}\n\
             - CORS origins: {}\n\
             - Environment: {}\n\
             - Log level: {}\n\
             - Database: {}\n\
             - Auto-migrate: {}\n\
             - Generation strategy: {}\n\
             - Generation max tokens: {}\n\
             - Generation temperature: {}",
            self.http.port,
            self.http.cors_origins.join(", "),
            self.environment,
            self.log_level,
            self.database.url,
            self.database.auto_migrate,
            self.generation.strategy,
            self.generation.max_tokens,
            self.generation.temperature,
        )
    }
}

/// Get environment variable with a default fallback
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
