// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database location, paging limits, and identity header from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! Environment-based configuration management for production deployment

use std::env;
use std::fmt::{self, Display};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use changeflow_core::constants::{defaults, http};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::changes::WorkflowConfig;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        })
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        })
    }
}

/// Type-safe record store location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// Process-local maps, nothing persisted
    InMemory,
    /// `SQLite` database held in memory
    SqliteMemory,
    /// `SQLite` database file
    SQLite {
        /// Database file path
        path: PathBuf,
    },
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported schemes or an empty path
    pub fn parse_url(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("memory") {
            return Ok(Self::InMemory);
        }
        let path = trimmed
            .strip_prefix("sqlite:")
            .ok_or_else(|| anyhow!("Unsupported database URL: {trimmed}"))?;
        match path.trim_start_matches("//") {
            ":memory:" => Ok(Self::SqliteMemory),
            "" => Err(anyhow!("SQLite database path is empty")),
            file => Ok(Self::SQLite {
                path: PathBuf::from(file),
            }),
        }
    }

    /// Connection string for sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::InMemory => "memory".to_owned(),
            Self::SqliteMemory => "sqlite::memory:".to_owned(),
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
        }
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SqliteMemory
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Application log level
    pub log_level: LogLevel,
    /// Record store location
    pub database_url: DatabaseUrl,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Settings passed into each change workflow
    pub workflow: WorkflowConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            environment: Environment::default(),
            log_level: LogLevel::default(),
            database_url: DatabaseUrl::default(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            workflow: WorkflowConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or the
    /// resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &defaults::HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            database_url: DatabaseUrl::parse_url(&env_var_or(
                "DATABASE_URL",
                defaults::DATABASE_URL,
            ))
            .context("Invalid DATABASE_URL value")?,
            request_timeout_secs: env_var_or(
                "REQUEST_TIMEOUT_SECS",
                &defaults::REQUEST_TIMEOUT_SECS.to_string(),
            )
            .parse()
            .context("Invalid REQUEST_TIMEOUT_SECS value")?,
            workflow: WorkflowConfig {
                default_application_type: env_var_or(
                    "DEFAULT_APPLICATION_TYPE",
                    defaults::APPLICATION_TYPE,
                ),
                default_page_size: env_var_or("DEFAULT_PAGE_SIZE", &defaults::PAGE_SIZE.to_string())
                    .parse()
                    .context("Invalid DEFAULT_PAGE_SIZE value")?,
                max_page_size: env_var_or("MAX_PAGE_SIZE", &defaults::MAX_PAGE_SIZE.to_string())
                    .parse()
                    .context("Invalid MAX_PAGE_SIZE value")?,
                user_header: env_var_or("USER_HEADER", http::USER_HEADER).to_lowercase(),
            },
        };

        config.validate()?;
        info!("Configuration loaded from environment");
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        let workflow = &self.workflow;
        if workflow.default_page_size == 0 || workflow.max_page_size == 0 {
            return Err(anyhow!("Page sizes must be greater than zero"));
        }
        if workflow.default_page_size > workflow.max_page_size {
            return Err(anyhow!(
                "DEFAULT_PAGE_SIZE ({}) cannot exceed MAX_PAGE_SIZE ({})",
                workflow.default_page_size,
                workflow.max_page_size
            ));
        }
        if workflow.default_application_type.trim().is_empty() {
            return Err(anyhow!("DEFAULT_APPLICATION_TYPE cannot be empty"));
        }
        if workflow.user_header.trim().is_empty() {
            return Err(anyhow!("USER_HEADER cannot be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("REQUEST_TIMEOUT_SECS must be greater than zero"));
        }
        if self.environment.is_production()
            && matches!(
                self.database_url,
                DatabaseUrl::InMemory | DatabaseUrl::SqliteMemory
            )
        {
            warn!("Production environment is running with a non-persistent record store");
        }
        Ok(())
    }

    /// Human readable summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Change Approval Service Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Default Application Type: {}\n\
             - Page Size: {} (max {})\n\
             - Identity Header: {}\n\
             - Request Timeout: {}s",
            self.http_port,
            self.environment,
            self.log_level,
            self.database_url.to_connection_string(),
            self.workflow.default_application_type,
            self.workflow.default_page_size,
            self.workflow.max_page_size,
            self.workflow.user_header,
            self.request_timeout_secs,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
