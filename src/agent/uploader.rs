use log::{error, info};
use serde::Serialize;
use std::time::Duration;

use crate::telemetry::{UnitFields, UnitRecord};

use super::error::UploadError;

#[derive(Serialize)]
struct UploadBody<'a> {
    mac: &'a str,
    #[serde(flatten)]
    fields: &'a UnitFields,
}

/// Fire-and-forget submission of partial records to the collector. Failed
/// submissions are logged and dropped; the next cycle carries fresh data.
#[derive(Clone)]
pub struct TelemetryUploader {
    client: reqwest::Client,
    endpoint: String,
    mac: String,
    timeout: Duration,
}

impl TelemetryUploader {
    pub fn new(client: reqwest::Client, base_url: &str, mac: String, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: format!("{}/bot/update", base_url.trim_end_matches('/')),
            mac,
            timeout,
        }
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub async fn try_upload(&self, fields: &UnitFields) -> Result<UnitRecord, UploadError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&UploadBody {
                mac: &self.mac,
                fields,
            })
            .send()
            .await
            .map_err(UploadError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        response.json().await.map_err(UploadError::Decode)
    }

    /// Submits once and reports whether the collector accepted the record.
    pub async fn upload(&self, fields: &UnitFields) -> bool {
        match self.try_upload(fields).await {
            Ok(record) => {
                info!(
                    "Updated bot data for {} ({} positions in history)",
                    self.mac,
                    record.historical_positions.len()
                );
                true
            }
            Err(e @ UploadError::Transport(_)) => {
                error!("Network error sending data to collector: {}", e);
                false
            }
            Err(e) => {
                error!("Failed to update bot data: {}", e);
                false
            }
        }
    }
}
