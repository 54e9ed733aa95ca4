use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use reqwest::Url;
use tracing::{info, warn};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/";
pub const DEFAULT_AUTOSAVE_MS: u64 = 800;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for talking to the recipe API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root every API path is resolved against. Always ends with `/`.
    pub api_url: Url,
    /// Quiet window of the draft autosave debounce.
    pub autosave_quiet: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            autosave_quiet: Duration::from_millis(DEFAULT_AUTOSAVE_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads `WASFEINES_API_URL`, `WASFEINES_AUTOSAVE_MS` and
    /// `WASFEINES_TIMEOUT_SECS`, falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url: String = try_load("WASFEINES_API_URL", DEFAULT_API_URL)?;
        let autosave_ms: u64 =
            try_load("WASFEINES_AUTOSAVE_MS", &DEFAULT_AUTOSAVE_MS.to_string())?;
        let timeout_secs: u64 =
            try_load("WASFEINES_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())?;

        Ok(Self {
            api_url: parse_base_url("WASFEINES_API_URL", &api_url)?,
            autosave_quiet: Duration::from_millis(autosave_ms),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_base_url("api_url", url)?;
        Ok(self)
    }

    pub fn with_autosave_quiet(mut self, quiet: Duration) -> Self {
        self.autosave_quiet = quiet;
        self
    }
}

/// Settings for the reference API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Origin written into slot and content URLs handed to clients.
    pub public_url: String,
    pub recipes_file: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let public_url: String = try_load("WASFEINES_PUBLIC_URL", "http://localhost:3000")?;
        Ok(Self {
            bind: try_load("WASFEINES_BIND", "0.0.0.0:3000")?,
            public_url: public_url.trim_end_matches('/').to_string(),
            recipes_file: try_load("WASFEINES_RECIPES_FILE", "recipes.json")?,
        })
    }
}

fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    // without the trailing slash `Url::join` would drop the last path segment
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}
