//! Entry point of the forecasting core.
//!
//! Given the freshly counted activity, the current weather and whatever the
//! history store returned, either short-circuits (not enough history) or runs
//! assemble → fit → predict → score. Synchronous and stateless between calls.

use crate::application::ml::{
    DeviationScorer, ForecastModel, MlpRegressor, ModelParameters, WindowAssembler,
};
use crate::domain::errors::ForecastError;
use crate::domain::forecast::{ForecastResult, HistoryFetch};
use crate::domain::observation::{RawActivity, WeatherReading};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ForecastOrchestrator {
    params: ModelParameters,
}

impl ForecastOrchestrator {
    pub fn new(params: ModelParameters) -> Self {
        Self { params }
    }

    /// Runs the pipeline with a freshly initialized [`MlpRegressor`].
    pub fn forecast(
        &self,
        current: RawActivity,
        weather: &WeatherReading,
        history: &HistoryFetch,
    ) -> Result<ForecastResult, ForecastError> {
        self.forecast_with(MlpRegressor::new(self.params.clone()), current, weather, history)
    }

    pub fn forecast_with<M: ForecastModel>(
        &self,
        mut model: M,
        current: RawActivity,
        weather: &WeatherReading,
        history: &HistoryFetch,
    ) -> Result<ForecastResult, ForecastError> {
        let window = match history {
            HistoryFetch::Insufficient => {
                info!("Insufficient history, skipping prediction");
                return Ok(ForecastResult::insufficient());
            }
            HistoryFetch::Sufficient(window) => window,
        };

        let training_set = WindowAssembler::assemble(window);
        let Some(last) = window.last().filter(|_| !training_set.is_empty()) else {
            info!(
                "History window of {} observations yields no training rows, skipping prediction",
                window.len()
            );
            return Ok(ForecastResult::insufficient());
        };

        info!(
            "Fitting {} on {} rows ({} epochs, batch {})",
            model.name(),
            training_set.len(),
            self.params.epochs,
            self.params.batch_size
        );
        model.fit(&training_set)?;

        let features = WindowAssembler::live_features(last, current, weather);
        let prediction = model.predict(&features)?;

        debug!(
            "Label scale: {:?}",
            DeviationScorer::label_scale(&training_set.labels)
        );
        let deviation = DeviationScorer::score(&training_set.labels, last.raw_activity, current);

        info!(
            "Prediction: in={:.2}, out={:.2}; deviation={:.3}",
            prediction[0], prediction[1], deviation
        );
        Ok(ForecastResult::full(prediction.into(), deviation))
    }
}
