//! Profile Service Configuration
//!
//! Environment-driven settings for the remote profile service client.

use serde::{Deserialize, Serialize};

use review_coach_core::{CoreError, CoreResult};

/// Default base URL of the profile service (local dev deployment)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Connection settings for the remote profile service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileApiConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ProfileApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ProfileApiConfig {
    /// Read configuration from `PROFILE_API_BASE_URL` and
    /// `PROFILE_API_TIMEOUT_MS`, falling back to defaults when unset.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_vars(
            std::env::var("PROFILE_API_BASE_URL").ok(),
            std::env::var("PROFILE_API_TIMEOUT_MS").ok(),
        )
    }

    fn from_vars(base_url: Option<String>, timeout_ms: Option<String>) -> CoreResult<Self> {
        let base_url = base_url
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CoreError::validation(format!(
                "PROFILE_API_BASE_URL must be an http(s) URL: {:?}",
                base_url
            )));
        }

        let timeout_ms = match timeout_ms {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoreError::config(format!("invalid PROFILE_API_TIMEOUT_MS: {:?}", raw))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            base_url,
            timeout_ms,
        })
    }
}
