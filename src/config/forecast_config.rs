//! Forecast window and training settings.

use super::{Lookup, parse_optional, parse_positive};
use crate::application::ml::ModelParameters;
use crate::domain::errors::ConfigurationError;

/// Number of stored observations requested for training
pub const DEFAULT_PREDICTION_WINDOW: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEnvConfig {
    pub prediction_window: usize,
    pub model: ModelParameters,
}

impl Default for ForecastEnvConfig {
    fn default() -> Self {
        Self {
            prediction_window: DEFAULT_PREDICTION_WINDOW,
            model: ModelParameters::default(),
        }
    }
}

impl ForecastEnvConfig {
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self, ConfigurationError> {
        let defaults = ModelParameters::default();

        let model = ModelParameters::default()
            .with_epochs(parse_positive(lookup, "SDP_TRAINING_EPOCHS")?.unwrap_or(defaults.epochs))
            .with_batch_size(
                parse_positive(lookup, "SDP_TRAINING_BATCH_SIZE")?.unwrap_or(defaults.batch_size),
            )
            .with_learning_rate(
                parse_positive(lookup, "SDP_LEARNING_RATE")?.unwrap_or(defaults.learning_rate),
            )
            .with_seed(parse_optional(lookup, "SDP_MODEL_SEED")?);

        Ok(Self {
            prediction_window: parse_optional(lookup, "SDP_PREDICTION_WINDOW")?
                .unwrap_or(DEFAULT_PREDICTION_WINDOW),
            model,
        })
    }
}
