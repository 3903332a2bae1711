// Windowing, model and deviation scoring
pub mod ml;

// Forecasting core entry point
pub mod forecast_orchestrator;

// Per-invocation workflow around the core
pub mod reporting_cycle;

pub use forecast_orchestrator::ForecastOrchestrator;
pub use reporting_cycle::{CycleReport, ReportingCycle};
