//! Configuration module for environment variables and application settings

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use anyhow::{Result, anyhow};

#[derive(Debug, Clone)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseSettings,

    /// Server configuration
    pub server: ServerConfig,

    /// Poster storage and public URL configuration
    pub storage: StorageConfig,

    /// Token and OTP lifetimes
    pub auth: AuthConfig,

    /// SMTP settings, absent when `SMTP_HOST` is unset
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory poster files are written to
    pub poster_dir: PathBuf,
    /// Public base URL used to build `{base_url}/file/{poster}`
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_hours: i64,
    pub otp_ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
}

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "noreply@movieflix.local";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database: DatabaseSettings {
                url: env::var("DATABASE_URL")
                    .map_err(|_| anyhow!("DATABASE_URL environment variable is required"))?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 16),
            },

            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_or("PORT", 8080),
                cors_origins: env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect(),
            },

            storage: StorageConfig {
                poster_dir: PathBuf::from(
                    env::var("POSTER_DIR").unwrap_or_else(|_| "posters".to_string()),
                ),
                base_url: env::var("BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            },

            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .ok()
                    .filter(|secret| !secret.is_empty())
                    .ok_or_else(|| anyhow!("JWT_SECRET environment variable is required"))?,
                access_token_ttl_minutes: parse_or("JWT_ACCESS_TTL_MINUTES", 25),
                refresh_token_ttl_hours: parse_or("JWT_REFRESH_TTL_HOURS", 168),
                otp_ttl_seconds: parse_or("OTP_TTL_SECONDS", 70),
            },

            mail: MailConfig::from_env(),
        })
    }
}

impl MailConfig {
    /// Returns `None` when `SMTP_HOST` is not set, meaning mail is only logged
    pub fn from_env() -> Option<Self> {
        let smtp_host = env::var("SMTP_HOST").ok().filter(|host| !host.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: parse_or("SMTP_PORT", DEFAULT_SMTP_PORT),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset or malformed
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
