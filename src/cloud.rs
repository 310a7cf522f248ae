// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Motion connector for the cloud IoT platform.
//!
//! The platform exposes device state behind an authenticated REST API:
//! `connect` performs the token handshake, `device_status` fetches the
//! status list for one device, and [`pir_reading`] scans it for the PIR
//! entry. Request signing is delegated to the platform client concern and
//! kept to credential headers here.

use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;

use crate::config::CloudConfig;
use crate::error::{DeviceError, ParseError, ProtocolError, Result};
use crate::poller::{Sampler, TIMESTAMP_FORMAT};
use crate::record::Record;

/// Status code identifying the PIR entry in a device status list.
pub const PIR_CODE: &str = "pir";

/// Status value the platform reports while motion is detected.
pub const MOTION_VALUE: &str = "pir";

/// One normalized motion poll.
///
/// Equality covers the raw status token and the platform's own update
/// timestamp, so a timestamp-only move still counts as a change and logs a
/// row (platform heartbeat behavior, kept as-is).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionReading {
    /// Raw vendor status token (e.g. `"pir"` or `"none"`).
    pub status: String,
    /// Platform update timestamp, unix seconds.
    pub update_time: i64,
    device_timestamp: String,
}

impl MotionReading {
    /// Builds a reading, formatting the platform timestamp in `timezone`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] when `update_time` is outside
    /// the representable timestamp range.
    pub fn new(status: String, update_time: i64, timezone: Tz) -> std::result::Result<Self, ParseError> {
        let device_timestamp = DateTime::from_timestamp(update_time, 0)
            .ok_or_else(|| ParseError::InvalidValue {
                field: "update_time".to_string(),
                message: format!("{update_time} is not a valid unix timestamp"),
            })?
            .with_timezone(&timezone)
            .format(TIMESTAMP_FORMAT)
            .to_string();

        Ok(Self {
            status,
            update_time,
            device_timestamp,
        })
    }

    /// Returns the formatted platform timestamp.
    #[must_use]
    pub fn device_timestamp(&self) -> &str {
        &self.device_timestamp
    }

    /// Returns whether the status token reports motion.
    #[must_use]
    pub fn is_motion(&self) -> bool {
        self.status == MOTION_VALUE
    }

    /// Human-readable status for the console.
    #[must_use]
    pub fn pretty(&self) -> &'static str {
        if self.is_motion() {
            "Motion Detected"
        } else {
            "No Motion"
        }
    }
}

impl Record for MotionReading {
    fn headers() -> &'static [&'static str] {
        &["local_timestamp", "tuya_update_time", "motion_status"]
    }

    fn fields(&self, local_timestamp: &str) -> Vec<String> {
        vec![
            local_timestamp.to_string(),
            self.device_timestamp.clone(),
            self.status.clone(),
        ]
    }

    fn describe(&self) -> String {
        format!("{} | Tuya: {}", self.pretty(), self.device_timestamp)
    }
}

/// Envelope wrapping every cloud API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    result: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(DeviceError::Rejected {
                code: self.code.unwrap_or_default(),
                msg: self.msg.unwrap_or_default(),
            }
            .into());
        }
        self.result
            .ok_or_else(|| ParseError::MissingField("result".to_string()).into())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResult {
    access_token: String,
}

/// Device status payload returned by the cloud API.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatus {
    /// Status entries, one per data point the device reports.
    #[serde(default)]
    pub status: Vec<StatusEntry>,
    /// When the platform last saw the device update, unix seconds.
    pub update_time: Option<i64>,
}

/// One entry of a device status list.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEntry {
    /// Data point code (e.g. `"pir"`, `"battery_percentage"`).
    pub code: String,
    /// Data point value; shape varies per code.
    pub value: serde_json::Value,
}

/// Authenticated client for the cloud IoT API.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: Client,
    endpoint: String,
    access_id: String,
    access_key: String,
    token: Option<String>,
}

impl CloudClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client from the cloud configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Http`] when the HTTP client cannot be
    /// built.
    pub fn new(config: &CloudConfig) -> std::result::Result<Self, ProtocolError> {
        let http = Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            http,
            endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            access_id: config.access_id.clone(),
            access_key: config.access_key.clone(),
            token: None,
        })
    }

    /// Performs the token handshake.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::AuthenticationFailed`] when the platform
    /// rejects the credentials, or a transport/parse error otherwise.
    pub async fn connect(&mut self) -> Result<()> {
        let url = format!("{}/v1.0/token?grant_type=1", self.endpoint);

        tracing::debug!(url = %url, "Requesting cloud API token");

        let response = self
            .http
            .get(&url)
            .header("client_id", &self.access_id)
            .header("secret", &self.access_key)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        let envelope: ApiResponse<TokenResult> = response
            .json()
            .await
            .map_err(ProtocolError::Http)?;

        if !envelope.success {
            return Err(ProtocolError::AuthenticationFailed.into());
        }

        let result = envelope
            .result
            .ok_or_else(|| ParseError::MissingField("result".to_string()))?;
        self.token = Some(result.access_token);

        tracing::info!("Connected to cloud API");
        Ok(())
    }

    /// Fetches the status of one device.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NotConnected`] before [`connect`] has
    /// succeeded, [`DeviceError::Rejected`] on an unsuccessful envelope,
    /// or a transport/parse error.
    ///
    /// [`connect`]: CloudClient::connect
    pub async fn device_status(&self, device_id: &str) -> Result<DeviceStatus> {
        let token = self.token.as_ref().ok_or(ProtocolError::NotConnected)?;
        let url = format!("{}/v1.0/devices/{device_id}", self.endpoint);

        tracing::debug!(url = %url, "Querying device status");

        let response = self
            .http
            .get(&url)
            .header("client_id", &self.access_id)
            .header("access_token", token)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        let envelope: ApiResponse<DeviceStatus> = response
            .json()
            .await
            .map_err(ProtocolError::Http)?;

        envelope.into_result()
    }
}

/// Extracts the PIR reading from a device status payload.
///
/// # Errors
///
/// Returns [`ParseError::MissingField`] when the status list carries no
/// entry with code [`PIR_CODE`] or the payload has no update timestamp.
pub fn pir_reading(status: &DeviceStatus, timezone: Tz) -> std::result::Result<MotionReading, ParseError> {
    let entry = status
        .status
        .iter()
        .find(|entry| entry.code == PIR_CODE)
        .ok_or_else(|| ParseError::MissingField(format!("status entry with code {PIR_CODE:?}")))?;

    let update_time = status
        .update_time
        .ok_or_else(|| ParseError::MissingField("update_time".to_string()))?;

    let value = entry
        .value
        .as_str()
        .map_or_else(|| entry.value.to_string(), str::to_string);

    MotionReading::new(value, update_time, timezone)
}

/// Sampler producing one [`MotionReading`] per poll.
#[derive(Debug)]
pub struct MotionSampler {
    client: CloudClient,
    device_id: String,
    timezone: Tz,
}

impl MotionSampler {
    /// Creates a sampler over a connected client.
    #[must_use]
    pub fn new(client: CloudClient, config: &CloudConfig) -> Self {
        Self {
            client,
            device_id: config.device_id.clone(),
            timezone: config.timezone,
        }
    }
}

impl Sampler for MotionSampler {
    type Reading = MotionReading;

    async fn sample(&mut self) -> Result<MotionReading> {
        let status = self.client.device_status(&self.device_id).await?;
        Ok(pir_reading(&status, self.timezone)?)
    }
}
