use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
    pub cors_origin: String,
    pub body_limit_bytes: usize,

    // Sessions
    pub environment: Environment,
    pub session_cleanup_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    /// Session cookies are marked `Secure`.
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // PORT is what most hosting platforms inject, so it beats WEB_PORT.
        let web_port = match optional_env("PORT") {
            Some(_) => parse_env_u16("PORT", 4000)?,
            None => parse_env_u16("WEB_PORT", 4000)?,
        };

        Ok(Self {
            // Database
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/tuiter.sqlite")),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port,
            cors_origin: env_or_default("CORS_ORIGIN", "http://localhost:3000"),
            body_limit_bytes: parse_env_usize("BODY_LIMIT_BYTES", 10 * 1024 * 1024)?,

            // Sessions
            environment: parse_environment(&env_or_default("ENVIRONMENT", "development")),
            session_cleanup_interval: Duration::from_secs(parse_env_u64(
                "SESSION_CLEANUP_INTERVAL_SECS",
                3600,
            )?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cors_origin.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CORS_ORIGIN".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.body_limit_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "BODY_LIMIT_BYTES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.session_cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_CLEANUP_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_environment(value: &str) -> Environment {
    if value.eq_ignore_ascii_case("production") {
        Environment::Production
    } else {
        Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment() {
        assert_eq!(parse_environment("PRODUCTION"), Environment::Production);
        assert_eq!(parse_environment("production"), Environment::Production);
        assert_eq!(parse_environment("development"), Environment::Development);
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_env_u16("NONEXISTENT_TUITER_PORT", 4000).unwrap(), 4000);
        assert_eq!(parse_env_u64("NONEXISTENT_TUITER_SECS", 3600).unwrap(), 3600);
    }

    #[test]
    fn test_validate_rejects_empty_origin() {
        let config = Config {
            database_path: PathBuf::from("test.sqlite"),
            web_host: "127.0.0.1".to_string(),
            web_port: 4000,
            cors_origin: String::new(),
            body_limit_bytes: 1024,
            environment: Environment::Development,
            session_cleanup_interval: Duration::from_secs(60),
        };
        assert!(config.validate().is_err());

        let config = Config {
            cors_origin: "http://localhost:3000".to_string(),
            ..config
        };
        assert!(config.validate().is_ok());
        assert!(!config.secure_cookies());
    }
}
