//! Client for the central store that holds each device's observation series.
//!
//! - `GET  {base}/{serial}?limit=n` → stored rows, oldest first (204 when empty)
//! - `PUT  {base}/{serial}`         → append one row

use crate::domain::errors::ServiceError;
use crate::domain::forecast::{HistoryFetch, HistoryWindow, UploadPayload};
use crate::domain::observation::Observation;
use crate::domain::ports::{HistoryProvider, UploadSink};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

const DOWNLOAD: &str = "download data";
const UPLOAD: &str = "upload data";

pub struct HistoryStoreClient {
    client: Client,
    device_url: String,
}

impl HistoryStoreClient {
    pub fn new(client: Client, device_url: String) -> Self {
        Self { client, device_url }
    }
}

#[async_trait]
impl HistoryProvider for HistoryStoreClient {
    async fn fetch(&self, limit: usize) -> Result<HistoryFetch, ServiceError> {
        let response = self
            .client
            .get(&self.device_url)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                operation: DOWNLOAD,
                source,
            })?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|source| ServiceError::Transport {
                        operation: DOWNLOAD,
                        source,
                    })?;
                let observations: Vec<Observation> =
                    serde_json::from_slice(&body).map_err(|e| ServiceError::Decode {
                        operation: DOWNLOAD,
                        reason: e.to_string(),
                    })?;

                debug!("Downloaded {} stored observations", observations.len());
                Ok(HistoryFetch::from_window(HistoryWindow::new(
                    observations,
                    limit,
                )))
            }
            StatusCode::NO_CONTENT => {
                info!("History store has no data for this device yet");
                Ok(HistoryFetch::Insufficient)
            }
            status => Err(ServiceError::UnexpectedStatus {
                operation: DOWNLOAD,
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl UploadSink for HistoryStoreClient {
    async fn upload(&self, payload: &UploadPayload) -> Result<(), ServiceError> {
        info!("Uploading {}", serde_json::to_string(payload).unwrap_or_default());

        let response = self
            .client
            .put(&self.device_url)
            .json(payload)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                operation: UPLOAD,
                source,
            })?;

        if !response.status().is_success() {
            return Err(ServiceError::UnexpectedStatus {
                operation: UPLOAD,
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
