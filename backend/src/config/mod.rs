//! Central module for application-wide configuration settings.
//!
//! This module handles loading configuration parameters such as the database
//! URL, server port, logging options and the JWT signing settings. The config
//! is loaded once at startup and handed to the components that need it.

use anyhow::{Context, Result, bail};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
    pub server_debug: bool,
    pub log: LogConfig,
    pub jwt: JwtConfig,
}

/// Settings for token issuance and verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC key shared by signing and verification.
    pub secret: String,
    pub issuer: String,
    /// Access token lifetime.
    pub expires_in_seconds: u64,
    /// Refresh token lifetime, always longer than the access token lifetime.
    pub refresh_expires_in_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `template_backend=debug,sqlx=warn`.
    pub level: String,
    pub format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = var_or("DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = var_or("DB_ACQUIRE_TIMEOUT_SECONDS", "3")
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = var_or("SERVER_PORT", "3000")
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let server_debug = var_or("SERVER_DEBUG", "false")
            .parse::<bool>()
            .context("SERVER_DEBUG must be true or false")?;

        let format = match var_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => bail!("LOG_FORMAT must be text or json, got {}", other),
        };
        let log = LogConfig {
            level: var_or("LOG_LEVEL", "info"),
            format,
        };

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET not set")?,
            issuer: var_or("JWT_ISSUER", "template-backend"),
            expires_in_seconds: var_or("JWT_EXPIRES_IN_SECONDS", "86400")
                .parse::<u64>()
                .context("JWT_EXPIRES_IN_SECONDS must be a valid number")?,
            refresh_expires_in_seconds: var_or("JWT_REFRESH_EXPIRES_IN_SECONDS", "604800")
                .parse::<u64>()
                .context("JWT_REFRESH_EXPIRES_IN_SECONDS must be a valid number")?,
        };
        jwt.validate()?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
            server_debug,
            log,
            jwt,
        })
    }
}

/// Upper bound for either token lifetime (ten years).
pub const MAX_TOKEN_LIFETIME_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

impl JwtConfig {
    /// Rejects settings that would produce unusable or unsafe tokens.
    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if self.issuer.is_empty() {
            bail!("JWT_ISSUER must not be empty");
        }
        if self.expires_in_seconds == 0 {
            bail!("JWT_EXPIRES_IN_SECONDS must be greater than zero");
        }
        if self.refresh_expires_in_seconds > MAX_TOKEN_LIFETIME_SECONDS {
            bail!(
                "JWT_REFRESH_EXPIRES_IN_SECONDS must be at most {}",
                MAX_TOKEN_LIFETIME_SECONDS
            );
        }
        if self.refresh_expires_in_seconds <= self.expires_in_seconds {
            bail!("JWT_REFRESH_EXPIRES_IN_SECONDS must be greater than JWT_EXPIRES_IN_SECONDS");
        }
        Ok(())
    }
}
