//! API server configuration.
//!
//! Configuration is loaded from environment variables, after a local `.env`
//! file (if any) has been read, with fallback to defaults.

use std::env;
use std::net::SocketAddr;

use tabsplit_scan::{ScanError, VisionConfig};
use tabsplit_store::MAX_STORED_RECEIPTS;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: String,

    /// HTTP port (default: 8000)
    pub port: u16,

    /// Frontend origin allowed by CORS
    pub frontend_url: String,

    /// Upload size limit in bytes (default: 10 MiB)
    pub max_upload_bytes: usize,

    /// Receipt images kept in memory before the oldest is evicted
    /// (default: 100)
    pub max_stored_receipts: usize,

    /// Vision model settings
    pub vision: VisionConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            frontend_url: "http://localhost:3000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            max_stored_receipts: MAX_STORED_RECEIPTS,
            vision: VisionConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let port = match lookup("TABSPLIT_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TABSPLIT_PORT".to_string()))?,
            None => defaults.port,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string()))?,
            None => defaults.max_upload_bytes,
        };

        let max_stored_receipts = match lookup("MAX_STORED_RECEIPTS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidValue("MAX_STORED_RECEIPTS".to_string())),
            },
            None => defaults.max_stored_receipts,
        };

        Ok(ApiConfig {
            host: lookup("TABSPLIT_HOST").unwrap_or(defaults.host),
            port,
            frontend_url: lookup("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            max_upload_bytes,
            max_stored_receipts,
            vision: VisionConfig::from_lookup(&lookup)?,
        })
    }

    /// Socket address to bind.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TABSPLIT_HOST".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Vision(#[from] ScanError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_stored_receipts, 100);
        assert_eq!(config.bind_address().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("TABSPLIT_HOST", "127.0.0.1"),
            ("TABSPLIT_PORT", "9100"),
            ("FRONTEND_URL", "https://split.example"),
            ("VISION_MODEL", "vision-test"),
            ("MAX_STORED_RECEIPTS", "25"),
        ]))
        .unwrap();

        assert_eq!(config.max_stored_receipts, 25);

        assert_eq!(config.bind_address().unwrap().to_string(), "127.0.0.1:9100");
        assert_eq!(config.frontend_url, "https://split.example");
        assert_eq!(config.vision.model, "vision-test");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("TABSPLIT_PORT", "eighty")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("MAX_STORED_RECEIPTS", "0")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("VISION_TIMEOUT_SECS", "-1")])),
            Err(ConfigError::Vision(_))
        ));

        let config = ApiConfig::from_lookup(lookup_from(&[("TABSPLIT_HOST", "not a host")])).unwrap();
        assert!(config.bind_address().is_err());
    }
}
