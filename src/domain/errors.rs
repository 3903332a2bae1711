use thiserror::Error;

/// Errors raised while building the run configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Environment not configured: {name} is missing or empty")]
    Missing { name: &'static str },

    #[error("Invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors related to the process arguments
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Usage: {program} <num entered> <num left>")]
    Arity { program: String },

    #[error("Arguments 1 & 2 must be non-negative integers: {reason}")]
    NotAnInteger { reason: String },
}

/// Errors returned by the remote collaborators (history store, weather service)
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to {operation}: status {status}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    #[error("Failed to {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode {operation} response: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },

    #[error("Weather forecast contains no periods")]
    NoForecastPeriods,

    #[error("Wind speed {raw:?} has no leading number")]
    InvalidWindSpeed { raw: String },
}

/// Errors raised by the forecasting core
#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("Cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("Training set has {features} feature rows but {labels} labels")]
    BatchMismatch { features: usize, labels: usize },

    #[error("Model produced a non-finite output")]
    NonFiniteOutput,
}

/// Failure to append to the local raw-value log
#[derive(Debug, Error)]
#[error("Failed to append to raw log {path}: {source}")]
pub struct RawLogError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_formatting() {
        let error = ServiceError::UnexpectedStatus {
            operation: "download data",
            status: 500,
        };

        let msg = error.to_string();
        assert!(msg.contains("download data"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_configuration_error_names_variable() {
        let error = ConfigurationError::Missing {
            name: "SDP_DEVICE_SERIAL",
        };
        assert!(error.to_string().contains("SDP_DEVICE_SERIAL"));
    }
}
