//! In-memory collaborators for exercising the reporting cycle without a
//! network or filesystem.

use crate::domain::errors::{RawLogError, ServiceError};
use crate::domain::forecast::{HistoryFetch, UploadPayload};
use crate::domain::observation::{RawActivity, WeatherReading};
use crate::domain::ports::{HistoryProvider, RawValueLogger, UploadSink, WeatherProvider};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::sync::Mutex;

/// Serves a fixed history, or fails with the given status.
pub struct MockHistoryProvider {
    response: Result<HistoryFetch, u16>,
    requested_limits: Mutex<Vec<usize>>,
}

impl MockHistoryProvider {
    pub fn new(fetch: HistoryFetch) -> Self {
        Self {
            response: Ok(fetch),
            requested_limits: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            response: Err(status),
            requested_limits: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_limits(&self) -> Vec<usize> {
        self.requested_limits
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryProvider for MockHistoryProvider {
    async fn fetch(&self, limit: usize) -> Result<HistoryFetch, ServiceError> {
        if let Ok(mut limits) = self.requested_limits.lock() {
            limits.push(limit);
        }
        match &self.response {
            Ok(fetch) => Ok(fetch.clone()),
            Err(status) => Err(ServiceError::UnexpectedStatus {
                operation: "download data",
                status: *status,
            }),
        }
    }
}

pub struct MockWeatherProvider {
    reading: WeatherReading,
}

impl MockWeatherProvider {
    pub fn new(reading: WeatherReading) -> Self {
        Self { reading }
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn fetch(&self, _lat: f64, _lng: f64) -> Result<WeatherReading, ServiceError> {
        Ok(self.reading)
    }
}

/// Keeps every uploaded payload; optionally rejects with a status.
#[derive(Default)]
pub struct RecordingUploadSink {
    uploads: Mutex<Vec<UploadPayload>>,
    reject_with: Option<u16>,
}

impl RecordingUploadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(status: u16) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            reject_with: Some(status),
        }
    }

    pub fn uploads(&self) -> Vec<UploadPayload> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UploadSink for RecordingUploadSink {
    async fn upload(&self, payload: &UploadPayload) -> Result<(), ServiceError> {
        if let Some(status) = self.reject_with {
            return Err(ServiceError::UnexpectedStatus {
                operation: "upload data",
                status,
            });
        }
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(payload.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRawLogger {
    lines: Mutex<Vec<(DateTime<FixedOffset>, RawActivity)>>,
    broken: bool,
}

impl InMemoryRawLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always fails to append, like a read-only filesystem.
    pub fn broken() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            broken: true,
        }
    }

    pub fn entries(&self) -> Vec<(DateTime<FixedOffset>, RawActivity)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl RawValueLogger for InMemoryRawLogger {
    fn append(
        &self,
        timestamp: DateTime<FixedOffset>,
        activity: RawActivity,
    ) -> Result<(), RawLogError> {
        if self.broken {
            return Err(RawLogError {
                path: "<memory>".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((timestamp, activity));
        }
        Ok(())
    }
}
