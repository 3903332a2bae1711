//! Endpoints and local paths used by the collaborators around the core.

use super::{Lookup, parse_optional};
use crate::domain::errors::ConfigurationError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WEATHER_API_BASE_URL: &str = "https://api.weather.gov";
pub const DEFAULT_RAW_LOG_PATH: &str = "sdp-beehive.raw-data.log";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEnvConfig {
    pub weather_api_base_url: String,
    pub raw_log_path: PathBuf,
    pub http_timeout: Duration,
}

impl Default for ServiceEnvConfig {
    fn default() -> Self {
        Self {
            weather_api_base_url: DEFAULT_WEATHER_API_BASE_URL.to_string(),
            raw_log_path: PathBuf::from(DEFAULT_RAW_LOG_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ServiceEnvConfig {
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self, ConfigurationError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            weather_api_base_url: non_empty("SDP_WEATHER_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_WEATHER_API_BASE_URL.to_string()),
            raw_log_path: non_empty("SDP_RAW_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RAW_LOG_PATH)),
            http_timeout: Duration::from_secs(
                parse_optional(lookup, "SDP_HTTP_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        })
    }
}
