//! Client configuration: API base URL, session file location and request
//! timeout. Values come from CLI flags or `TWITTER_CLIENT_*` environment
//! variables and are normalized here. Configuration values are public; do not
//! store secrets here.

use crate::error::{Error, Result};
use std::{path::PathBuf, time::Duration};
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:9999/api/v1";
pub const DEFAULT_STATE_FILE: &str = ".twitter-client/session.json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub state_path: PathBuf,
    pub timeout: Duration,
}

impl ClientConfig {
    /// # Errors
    /// Returns an error if the base URL is empty, cannot be parsed, has no host,
    /// or uses a scheme other than http(s).
    pub fn new(api_url: &str, state_path: impl Into<PathBuf>, timeout_seconds: u64) -> Result<Self> {
        let raw = normalize_value(api_url)
            .ok_or_else(|| Error::Config("API base URL is not configured.".to_string()))?;

        let api_base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|err| Error::Config(format!("Invalid API base URL {raw}: {err}")))?;

        match api_base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::Config(format!(
                    "Invalid API base URL: unsupported scheme {scheme}"
                )))
            }
        }

        if api_base_url.host().is_none() {
            return Err(Error::Config(
                "Invalid API base URL: no host specified".to_string(),
            ));
        }

        let timeout = if timeout_seconds == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
        } else {
            Duration::from_secs(timeout_seconds)
        };

        Ok(Self {
            api_base_url,
            state_path: state_path.into(),
            timeout,
        })
    }

    /// Joins an API path (`/auth/login`) onto the base URL (`.../api/v1`).
    ///
    /// # Errors
    /// Returns an error if the joined URL is not valid.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let joined = build_url_with_base(self.api_base_url.as_str(), path);

        debug!("endpoint URL: {}", joined);

        Url::parse(&joined).map_err(|err| Error::Config(format!("Invalid endpoint {joined}: {err}")))
    }
}

fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Trims a raw value and treats blank input as absent.
#[must_use]
pub fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
