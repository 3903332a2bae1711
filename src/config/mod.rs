//! Configuration module for Hivecast.
//!
//! The run configuration is read once from environment variables (after an
//! optional `.env` file) and then passed around immutably. Loading goes
//! through a key lookup so tests can supply values without touching the
//! process environment.

mod device_config;
mod forecast_config;
mod service_config;

pub use device_config::DeviceEnvConfig;
pub use forecast_config::{DEFAULT_PREDICTION_WINDOW, ForecastEnvConfig};
pub use service_config::ServiceEnvConfig;

use crate::domain::errors::ConfigurationError;
use std::env;
use std::str::FromStr;

/// Source of raw configuration values, keyed by variable name.
pub type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub device: DeviceEnvConfig,
    pub forecast: ForecastEnvConfig,
    pub services: ServiceEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            device: DeviceEnvConfig::from_lookup(lookup)?,
            forecast: ForecastEnvConfig::from_lookup(lookup)?,
            services: ServiceEnvConfig::from_lookup(lookup)?,
        })
    }

    /// `{base}/{serial}`, the store resource for this device.
    pub fn device_url(&self) -> String {
        format!("{}/{}", self.device.server_base_url, self.device.serial)
    }
}

fn require(lookup: &Lookup<'_>, name: &'static str) -> Result<String, ConfigurationError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigurationError::Missing { name }),
    }
}

fn parse_value<T>(name: &'static str, value: String) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigurationError::Invalid {
            name,
            reason: e.to_string(),
            value,
        })
}

fn parse_required<T>(lookup: &Lookup<'_>, name: &'static str) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(name, require(lookup, name)?)
}

/// Absent or blank values yield `None`; malformed ones are an error.
fn parse_optional<T>(
    lookup: &Lookup<'_>,
    name: &'static str,
) -> Result<Option<T>, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => parse_value(name, value).map(Some),
        _ => Ok(None),
    }
}

/// Like [`parse_optional`], but the value must be strictly greater than zero.
fn parse_positive<T>(
    lookup: &Lookup<'_>,
    name: &'static str,
) -> Result<Option<T>, ConfigurationError>
where
    T: FromStr + PartialOrd + Default + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match parse_optional::<T>(lookup, name)? {
        // `!(v > 0)` also catches NaN
        Some(value) if !(value > T::default()) => Err(ConfigurationError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        parsed => Ok(parsed),
    }
}
