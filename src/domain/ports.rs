use crate::domain::errors::{RawLogError, ServiceError};
use crate::domain::forecast::{HistoryFetch, UploadPayload};
use crate::domain::observation::{RawActivity, WeatherReading};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetch at most `limit` stored observations, oldest first.
    async fn fetch(&self, limit: usize) -> Result<HistoryFetch, ServiceError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Weather expected at the device location one hour from now.
    async fn fetch(&self, lat: f64, lng: f64) -> Result<WeatherReading, ServiceError>;
}

#[async_trait]
pub trait UploadSink: Send + Sync {
    async fn upload(&self, payload: &UploadPayload) -> Result<(), ServiceError>;
}

/// Local append-only record of the raw counts.
pub trait RawValueLogger: Send + Sync {
    fn append(
        &self,
        timestamp: DateTime<FixedOffset>,
        activity: RawActivity,
    ) -> Result<(), RawLogError>;
}
