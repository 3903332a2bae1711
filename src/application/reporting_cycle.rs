//! One scheduled invocation of the device: record the raw counts locally,
//! gather weather and history, forecast, and push the result to the store.

use crate::application::forecast_orchestrator::ForecastOrchestrator;
use crate::config::Config;
use crate::domain::forecast::{ForecastResult, UploadPayload};
use crate::domain::observation::RawActivity;
use crate::infrastructure::Services;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub payload: UploadPayload,
    pub result: ForecastResult,
}

pub struct ReportingCycle {
    services: Services,
    orchestrator: ForecastOrchestrator,
    latitude: f64,
    longitude: f64,
    prediction_window: usize,
}

impl ReportingCycle {
    pub fn new(config: &Config, services: Services) -> Self {
        Self {
            services,
            orchestrator: ForecastOrchestrator::new(config.forecast.model.clone()),
            latitude: config.device.latitude,
            longitude: config.device.longitude,
            prediction_window: config.forecast.prediction_window,
        }
    }

    pub async fn run(&self, activity: RawActivity) -> Result<CycleReport> {
        self.run_at(Local::now().fixed_offset(), activity).await
    }

    pub async fn run_at(
        &self,
        now: DateTime<FixedOffset>,
        activity: RawActivity,
    ) -> Result<CycleReport> {
        if let Err(e) = self.services.raw_log.append(now, activity) {
            warn!("Error: {}", e);
        }

        let weather = self
            .services
            .weather
            .fetch(self.latitude, self.longitude)
            .await
            .context("Failed to fetch current weather")?;

        let history = self
            .services
            .history
            .fetch(self.prediction_window)
            .await
            .context("Failed to download past data")?;

        let result = self
            .orchestrator
            .forecast(activity, &weather, &history)
            .context("Forecast failed")?;

        let payload = UploadPayload::new(now, activity, weather, &result);
        self.services
            .upload
            .upload(&payload)
            .await
            .context("Failed to upload data")?;

        info!(
            "Cycle complete: in={}, out={}, prediction={}",
            activity.entries,
            activity.exits,
            if result.prediction.is_some() { "yes" } else { "skipped" }
        );
        Ok(CycleReport { payload, result })
    }
}
