pub mod deviation;
pub mod forecast_model;
pub mod window_assembler;

pub use deviation::{DeviationScorer, MIN_LABEL_STD_DEV};
pub use forecast_model::{ForecastModel, MlpRegressor, ModelParameters};
pub use window_assembler::{FeatureVector, Label, TrainingSet, WindowAssembler};
