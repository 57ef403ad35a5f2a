//! Server configuration from environment variables.
//!
//! HOST (default 0.0.0.0), PORT (default 8080), MAX_BRACKET_SIZE (default 64, a power
//! of two), BRACKET_SEED (optional u64; makes seeding deterministic).

use crate::logic::{BracketPolicy, DEFAULT_MAX_BRACKET_SIZE};
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_bracket_size: u32,
    pub seed: Option<u64>,
}

/// An environment variable with an unusable value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}: {}", self.key, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_bracket_size: DEFAULT_MAX_BRACKET_SIZE,
            seed: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let invalid = |key: &'static str, value: String, reason: &'static str| ConfigError {
            key,
            value,
            reason,
        };

        let mut config = Self::default();
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .parse()
                .map_err(|_| invalid("PORT", port, "expected a port number"))?;
        }
        if let Some(size) = get("MAX_BRACKET_SIZE") {
            config.max_bracket_size = size
                .parse::<u32>()
                .ok()
                .filter(|s| *s >= 2 && s.is_power_of_two())
                .ok_or_else(|| invalid("MAX_BRACKET_SIZE", size, "expected a power of two >= 2"))?;
        }
        if let Some(seed) = get("BRACKET_SEED") {
            config.seed = Some(
                seed.parse()
                    .map_err(|_| invalid("BRACKET_SEED", seed, "expected an unsigned integer"))?,
            );
        }
        Ok(config)
    }

    pub fn policy(&self) -> BracketPolicy {
        BracketPolicy {
            max_bracket_size: self.max_bracket_size,
        }
    }
}
