//! Device identity and location, read from the `SDP_*` environment variables.
//!
//! All four values are required; a missing or empty one aborts the run.

use super::{Lookup, parse_required, require};
use crate::domain::errors::ConfigurationError;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEnvConfig {
    pub server_base_url: String,
    pub serial: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl DeviceEnvConfig {
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            server_base_url: require(lookup, "SDP_SERVER_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            serial: require(lookup, "SDP_DEVICE_SERIAL")?,
            latitude: parse_required(lookup, "SDP_DEVICE_Lat")?,
            longitude: parse_required(lookup, "SDP_DEVICE_Lang")?,
        })
    }
}
