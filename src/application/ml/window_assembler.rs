//! Turns a stored history window into a supervised training set.
//!
//! A row anchored at index `i` reads the activity at `i` and `i + 1` plus the
//! weather at `i + 2`, and is labelled with the activity at `i + 2`.

use crate::domain::forecast::HistoryWindow;
use crate::domain::observation::{Observation, RawActivity, WeatherReading};

pub const FEATURE_DIM: usize = 7;
pub const LABEL_DIM: usize = 2;

/// `[in_t, out_t, in_t+1, out_t+1, temp_t+2, humidity_t+2, windspeed_t+2]`
pub type FeatureVector = [f64; FEATURE_DIM];

/// `[in_t+2, out_t+2]`
pub type Label = [f64; LABEL_DIM];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<Label>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub struct WindowAssembler;

impl WindowAssembler {
    /// Builds `n - 2` rows in window order; windows shorter than 3 give an empty set.
    pub fn assemble(window: &HistoryWindow) -> TrainingSet {
        let observations = window.observations();
        let rows = observations.len().saturating_sub(2);

        let mut set = TrainingSet {
            features: Vec::with_capacity(rows),
            labels: Vec::with_capacity(rows),
        };

        for triple in observations.windows(3) {
            let (first, second, target) = (&triple[0], &triple[1], &triple[2]);
            set.features.push(Self::feature_row(
                first.raw_activity,
                second.raw_activity,
                &target.weather,
            ));
            set.labels.push(target.raw_activity.as_pair());
        }

        set
    }

    /// Query vector for the step after the window: last stored activity,
    /// freshly counted activity, and the current weather.
    pub fn live_features(
        last: &Observation,
        current: RawActivity,
        weather: &WeatherReading,
    ) -> FeatureVector {
        Self::feature_row(last.raw_activity, current, weather)
    }

    fn feature_row(
        earlier: RawActivity,
        later: RawActivity,
        weather: &WeatherReading,
    ) -> FeatureVector {
        let [in_a, out_a] = earlier.as_pair();
        let [in_b, out_b] = later.as_pair();
        let [temp, humidity, wind] = weather.as_triple();
        [in_a, out_a, in_b, out_b, temp, humidity, wind]
    }
}
