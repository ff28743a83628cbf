//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string
//! - `BAZAAR_JWT_SECRET` - Token signing secret (min 32 chars)
//!
//! ## Optional
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 3000)
//! - `BAZAAR_UPLOAD_DIR` - Image upload directory (default: uploads)
//! - `BAZAAR_ACCESS_TOKEN_TTL_MINUTES` - Access token lifetime (default: 15)
//! - `BAZAAR_REFRESH_TOKEN_TTL_DAYS` - Refresh token lifetime (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Access token lifetime in minutes
    pub access_token_ttl_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,
    /// Root directory for stored images
    pub upload_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value
    /// fails to parse, or the JWT secret is too short.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Split out from [`Self::from_env`] so tests can supply variables
    /// without mutating the process environment.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = require(&lookup, "BAZAAR_DATABASE_URL")?;
        let jwt_secret = require(&lookup, "BAZAAR_JWT_SECRET")?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::InsecureSecret(
                "BAZAAR_JWT_SECRET".to_owned(),
                format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
            ));
        }

        let host = parse_or(&lookup, "BAZAAR_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&lookup, "BAZAAR_PORT", 3000)?;
        let access_token_ttl_minutes =
            parse_or(&lookup, "BAZAAR_ACCESS_TOKEN_TTL_MINUTES", 15)?;
        let refresh_token_ttl_days = parse_or(&lookup, "BAZAAR_REFRESH_TOKEN_TTL_DAYS", 30)?;

        let upload_dir = lookup("BAZAAR_UPLOAD_DIR")
            .map_or_else(|| PathBuf::from("uploads"), PathBuf::from);

        Ok(Self {
            database_url: database_url.into(),
            host,
            port,
            jwt_secret: jwt_secret.into(),
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            upload_dir,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("BAZAAR_DATABASE_URL", "postgres://localhost/bazaar_test"),
            ("BAZAAR_JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ])
    }

    fn load(vars: &HashMap<&str, &str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).map(ToString::to_string))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_vars()).expect("valid config");
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.access_token_ttl_minutes, 15);
        assert_eq!(config.refresh_token_ttl_days, 30);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_missing_database_url() {
        let mut vars = base_vars();
        vars.remove("BAZAAR_DATABASE_URL");
        let err = load(&vars).expect_err("must fail");
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "BAZAAR_DATABASE_URL"));
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut vars = base_vars();
        vars.insert("BAZAAR_JWT_SECRET", "too-short");
        let err = load(&vars).expect_err("must fail");
        assert!(matches!(err, ConfigError::InsecureSecret(..)));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = base_vars();
        vars.insert("BAZAAR_PORT", "not-a-port");
        let err = load(&vars).expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "BAZAAR_PORT"));
    }

    #[test]
    fn test_socket_addr() {
        let mut vars = base_vars();
        vars.insert("BAZAAR_PORT", "8080");
        let config = load(&vars).expect("valid config");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    }
}
