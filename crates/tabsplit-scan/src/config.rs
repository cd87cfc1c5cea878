//! Vision client configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ANTHROPIC_API_KEY` | unset (scanning fails) |
//! | `VISION_MODEL` | `claude-sonnet-4-20250514` |
//! | `VISION_MAX_TOKENS` | `4096` |
//! | `VISION_API_URL` | `https://api.anthropic.com/v1/messages` |
//! | `VISION_TIMEOUT_SECS` | `60` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ScanError, ScanResult};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for [`crate::VisionClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionConfig {
    /// Missing keys are allowed at startup; scans then fail with
    /// [`ScanError::MissingApiKey`].
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl VisionConfig {
    /// Reads the process environment.
    pub fn from_env() -> ScanResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> ScanResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = VisionConfig::default();

        // The .env template ships with a placeholder key
        let api_key = lookup("ANTHROPIC_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != "your_api_key_here");

        Ok(VisionConfig {
            api_key,
            model: lookup("VISION_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_or(&lookup, "VISION_MAX_TOKENS", defaults.max_tokens)?,
            api_url: lookup("VISION_API_URL").unwrap_or(defaults.api_url),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "VISION_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> ScanResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ScanError::InvalidConfig(key.to_string())),
        None => Ok(default),
    }
}
