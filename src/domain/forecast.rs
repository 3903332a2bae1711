use super::observation::{Observation, Prediction, RawActivity, WeatherReading};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Fewest stored observations that still yield one training row.
pub const MIN_HISTORY_LEN: usize = 3;

/// Ordered slice of stored observations, oldest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryWindow {
    observations: Vec<Observation>,
}

impl HistoryWindow {
    /// Keeps at most `max_len` of the newest observations.
    pub fn new(mut observations: Vec<Observation>, max_len: usize) -> Self {
        if observations.len() > max_len {
            let skip = observations.len() - max_len;
            observations.drain(..skip);
        }
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }
}

/// Outcome of asking the history store for a training window.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryFetch {
    Sufficient(HistoryWindow),
    Insufficient,
}

impl HistoryFetch {
    /// Windows shorter than [`MIN_HISTORY_LEN`] collapse to `Insufficient`.
    pub fn from_window(window: HistoryWindow) -> Self {
        if window.len() < MIN_HISTORY_LEN {
            HistoryFetch::Insufficient
        } else {
            HistoryFetch::Sufficient(window)
        }
    }

    pub fn is_sufficient(&self) -> bool {
        matches!(self, HistoryFetch::Sufficient(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForecastResult {
    pub prediction: Option<Prediction>,
    pub deviation: Option<f64>,
}

impl ForecastResult {
    pub fn insufficient() -> Self {
        Self::default()
    }

    pub fn full(prediction: Prediction, deviation: f64) -> Self {
        Self {
            prediction: Some(prediction),
            deviation: Some(deviation),
        }
    }
}

/// Body sent to the history store for each invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPayload {
    #[serde(with = "super::observation::iso8601")]
    pub time: DateTime<FixedOffset>,
    pub raw_activity: RawActivity,
    pub weather: WeatherReading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_activity: Option<Prediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_prediction_deviation: Option<f64>,
}

impl UploadPayload {
    pub fn new(
        time: DateTime<FixedOffset>,
        raw_activity: RawActivity,
        weather: WeatherReading,
        result: &ForecastResult,
    ) -> Self {
        Self {
            time,
            raw_activity,
            weather,
            prediction_activity: result.prediction,
            last_prediction_deviation: result.deviation,
        }
    }
}
