// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness connector for the LAN smart bulb.
//!
//! The vendor API is consumed through the [`LightApi`] seam: resolve the
//! bulb's address to a connected handle, refresh its state, and read the
//! light capability out of the returned payload. The payload shape is not
//! stable across firmware versions, so capability lookup and field
//! extraction both go through ordered fallback strategies (see
//! [`Capabilities`] and [`read_light`]).

mod capabilities;
mod extract;

pub use capabilities::{Capabilities, LIGHT};
pub use extract::{coerce_on_off, read_light};

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::{DeviceError, ParseError, ProtocolError, Result};
use crate::poller::Sampler;
use crate::record::Record;

/// One normalized brightness poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulbReading {
    /// Brightness level reported by the light capability.
    pub brightness: i64,
    /// Whether the light is on, coerced to a plain boolean.
    pub is_on: bool,
}

impl Record for BulbReading {
    fn headers() -> &'static [&'static str] {
        &["local_timestamp", "brightness", "is_on"]
    }

    fn fields(&self, local_timestamp: &str) -> Vec<String> {
        vec![
            local_timestamp.to_string(),
            self.brightness.to_string(),
            self.is_on.to_string(),
        ]
    }

    fn describe(&self) -> String {
        format!("brightness={} is_on={}", self.brightness, self.is_on)
    }
}

/// Seam over the vendor's LAN light API.
///
/// Implementations own discovery, session handling and state refresh; the
/// poller only ever sees the raw state payload.
pub trait LightApi {
    /// Establishes a session with the device.
    ///
    /// Some firmware versions want the caller's host passed along, others
    /// reject it; [`connect_light`] drives the fallback chain.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] when the device refuses the session.
    async fn connect(&mut self, host: Option<&str>) -> std::result::Result<(), ProtocolError>;

    /// Pulls the latest device state payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] when the device cannot be reached.
    async fn refresh(&mut self) -> std::result::Result<Value, ProtocolError>;
}

/// [`LightApi`] implementation over the bulb's local HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpLightApi {
    base_url: String,
    client: Client,
}

impl HttpLightApi {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client for the bulb at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] for an empty address and
    /// [`ProtocolError::Http`] when the HTTP client cannot be built.
    pub fn new(addr: impl Into<String>) -> std::result::Result<Self, ProtocolError> {
        let addr = addr.into();
        if addr.is_empty() {
            return Err(ProtocolError::InvalidAddress("empty address".to_string()));
        }

        let base_url = if addr.starts_with("http://") || addr.starts_with("https://") {
            addr
        } else {
            format!("http://{addr}")
        };

        let client = Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self { base_url, client })
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl LightApi for HttpLightApi {
    async fn connect(&mut self, host: Option<&str>) -> std::result::Result<(), ProtocolError> {
        let mut request = self.client.get(format!("{}/api/session", self.base_url));
        if let Some(host) = host {
            request = request.query(&[("host", host)]);
        }

        let response = request.send().await.map_err(ProtocolError::Http)?;
        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "session request returned HTTP {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }

    async fn refresh(&mut self) -> std::result::Result<Value, ProtocolError> {
        let response = self
            .client
            .get(format!("{}/api/state", self.base_url))
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "state request returned HTTP {}",
                response.status().as_u16()
            )));
        }

        response.json().await.map_err(ProtocolError::Http)
    }
}

/// Resolves the bulb at `addr` to a ready-to-poll sampler.
///
/// Connection is best-effort with a fallback chain: try `connect` with the
/// host first, retry without it, and proceed to the state query either way.
/// The initial state query and the light-capability check are the real
/// gate: failing either is a fatal startup error.
///
/// # Errors
///
/// Returns [`DeviceError::NotFound`] when the device does not answer the
/// initial state query and [`DeviceError::NoLightCapability`] when the
/// state payload exposes no recognized light capability.
pub async fn connect_light<A: LightApi>(mut api: A, addr: &str) -> Result<BulbSampler<A>> {
    if let Err(error) = api.connect(Some(addr)).await {
        tracing::warn!(error = %error, "connect with host failed, retrying without host");
        if let Err(error) = api.connect(None).await {
            tracing::warn!(error = %error, "connect without host failed, proceeding to state query");
        }
    }

    let state = api
        .refresh()
        .await
        .map_err(|error| {
            tracing::error!(error = %error, addr, "device did not answer the initial state query");
            DeviceError::NotFound(addr.to_string())
        })?;

    let caps = Capabilities::new(&state);
    if caps.capability(LIGHT).is_none() {
        return Err(DeviceError::NoLightCapability {
            addr: addr.to_string(),
            found: caps.names(),
        }
        .into());
    }

    Ok(BulbSampler { api })
}

/// Sampler producing one [`BulbReading`] per poll.
#[derive(Debug)]
pub struct BulbSampler<A: LightApi> {
    api: A,
}

impl<A: LightApi> Sampler for BulbSampler<A> {
    type Reading = BulbReading;

    async fn sample(&mut self) -> Result<BulbReading> {
        let state = self.api.refresh().await?;

        let light = Capabilities::new(&state)
            .capability(LIGHT)
            .ok_or_else(|| ParseError::MissingField("light capability".to_string()))?;

        Ok(read_light(light)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    /// Scripted [`LightApi`] recording connect attempts.
    #[derive(Debug)]
    struct FakeApi {
        fail_with_host: bool,
        fail_without_host: bool,
        state: std::result::Result<Value, String>,
        connect_calls: Vec<Option<String>>,
    }

    impl FakeApi {
        fn new(state: Value) -> Self {
            Self {
                fail_with_host: false,
                fail_without_host: false,
                state: Ok(state),
                connect_calls: Vec::new(),
            }
        }

        fn unreachable() -> Self {
            Self {
                fail_with_host: true,
                fail_without_host: true,
                state: Err("connection refused".to_string()),
                connect_calls: Vec::new(),
            }
        }
    }

    impl LightApi for FakeApi {
        async fn connect(
            &mut self,
            host: Option<&str>,
        ) -> std::result::Result<(), ProtocolError> {
            self.connect_calls.push(host.map(str::to_string));
            let fail = if host.is_some() {
                self.fail_with_host
            } else {
                self.fail_without_host
            };
            if fail {
                Err(ProtocolError::ConnectionFailed("refused".to_string()))
            } else {
                Ok(())
            }
        }

        async fn refresh(&mut self) -> std::result::Result<Value, ProtocolError> {
            self.state
                .clone()
                .map_err(ProtocolError::ConnectionFailed)
        }
    }

    fn light_state() -> Value {
        json!({ "light": { "brightness": 40, "is_on": true } })
    }

    #[tokio::test]
    async fn connect_passes_host_first() {
        let api = FakeApi::new(light_state());
        let sampler = connect_light(api, "192.168.2.140").await.unwrap();
        assert_eq!(
            sampler.api.connect_calls,
            vec![Some("192.168.2.140".to_string())]
        );
    }

    #[tokio::test]
    async fn connect_falls_back_without_host() {
        let mut api = FakeApi::new(light_state());
        api.fail_with_host = true;

        let sampler = connect_light(api, "192.168.2.140").await.unwrap();
        assert_eq!(
            sampler.api.connect_calls,
            vec![Some("192.168.2.140".to_string()), None]
        );
    }

    #[tokio::test]
    async fn connect_failures_do_not_block_startup() {
        let mut api = FakeApi::new(light_state());
        api.fail_with_host = true;
        api.fail_without_host = true;

        // Both connect attempts fail but the state query succeeds.
        assert!(connect_light(api, "192.168.2.140").await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_device_is_fatal() {
        let api = FakeApi::unreachable();
        let err = connect_light(api, "192.168.2.140").await.unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::NotFound(addr)) if addr == "192.168.2.140"));
    }

    #[tokio::test]
    async fn missing_light_capability_is_fatal() {
        let api = FakeApi::new(json!({ "energy": { "power_w": 7 } }));
        let err = connect_light(api, "192.168.2.140").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Device(DeviceError::NoLightCapability { found, .. }) if found == vec!["energy".to_string()]
        ));
    }

    #[tokio::test]
    async fn sample_reads_normalized_reading() {
        let api = FakeApi::new(light_state());
        let mut sampler = connect_light(api, "192.168.2.140").await.unwrap();

        let reading = sampler.sample().await.unwrap();
        assert_eq!(
            reading,
            BulbReading {
                brightness: 40,
                is_on: true
            }
        );
    }

    #[tokio::test]
    async fn sample_without_brightness_is_recoverable() {
        let mut api = FakeApi::new(light_state());
        api.state = Ok(json!({ "light": { "color_temp": 2700 } }));

        let mut sampler = BulbSampler { api };
        let err = sampler.sample().await.unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::MissingField(_))));
    }

    #[test]
    fn bulb_reading_csv_fields() {
        let reading = BulbReading {
            brightness: 20,
            is_on: false,
        };
        assert_eq!(
            reading.fields("2025-01-01 12:00:00"),
            vec!["2025-01-01 12:00:00", "20", "false"]
        );
        assert_eq!(reading.describe(), "brightness=20 is_on=false");
    }
}
