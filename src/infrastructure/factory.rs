use crate::config::Config;
use crate::domain::ports::{HistoryProvider, RawValueLogger, UploadSink, WeatherProvider};
use crate::infrastructure::core::HttpClientFactory;
use crate::infrastructure::raw_log::FileRawValueLogger;
use crate::infrastructure::store::HistoryStoreClient;
use crate::infrastructure::weather::NwsWeatherClient;
use anyhow::{Context, Result};
use std::sync::Arc;

/// The four collaborators around the forecasting core.
#[derive(Clone)]
pub struct Services {
    pub history: Arc<dyn HistoryProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub upload: Arc<dyn UploadSink>,
    pub raw_log: Arc<dyn RawValueLogger>,
}

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_services(config: &Config) -> Result<Services> {
        let client = HttpClientFactory::create_client(config.services.http_timeout)
            .context("Failed to build HTTP client")?;
        let store = Arc::new(HistoryStoreClient::new(client.clone(), config.device_url()));

        Ok(Services {
            history: store.clone(),
            weather: Arc::new(NwsWeatherClient::new(
                client,
                config.services.weather_api_base_url.clone(),
            )),
            upload: store,
            raw_log: Arc::new(FileRawValueLogger::new(config.services.raw_log_path.clone())),
        })
    }
}
