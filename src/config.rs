// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Environment-derived configuration for both loggers.
//!
//! Required variables are checked up front so a misconfigured process fails
//! fast with a descriptive error instead of dying mid-loop. Binaries call
//! `dotenvy::dotenv()` before building a config, so a local `.env` file works
//! the same as real environment variables.

use chrono_tz::Tz;

use crate::error::ConfigError;

/// Default bulb address on the LAN.
pub const DEFAULT_BULB_ADDR: &str = "192.168.2.140";

/// Default timezone for log timestamps.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// Default path of the brightness CSV log.
pub const DEFAULT_BRIGHTNESS_LOG: &str = "brightness_log.csv";

/// Default path of the motion CSV log.
pub const DEFAULT_MOTION_LOG: &str = "lamp_data.csv";

/// Configuration for the cloud motion poller.
///
/// All four credentials are required; the poller refuses to start without
/// them.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Base URL of the cloud API (e.g. `https://openapi.tuyaeu.com`).
    pub api_endpoint: String,
    /// Cloud project access ID.
    pub access_id: String,
    /// Cloud project access key.
    pub access_key: String,
    /// ID of the motion sensor device.
    pub device_id: String,
    /// Timezone used to format log timestamps.
    pub timezone: Tz,
    /// Path of the motion CSV log.
    pub log_path: String,
}

impl CloudConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when `API_ENDPOINT`, `ACCESS_ID`,
    /// `ACCESS_KEY` or `DEVICE_ID` is not set, and
    /// [`ConfigError::InvalidVar`] when `LOG_TIMEZONE` is not a valid IANA
    /// timezone name.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_endpoint: require(&lookup, "API_ENDPOINT")?,
            access_id: require(&lookup, "ACCESS_ID")?,
            access_key: require(&lookup, "ACCESS_KEY")?,
            device_id: require(&lookup, "DEVICE_ID")?,
            timezone: timezone(&lookup)?,
            log_path: lookup("MOTION_LOG_PATH").unwrap_or_else(|| DEFAULT_MOTION_LOG.to_string()),
        })
    }
}

/// Configuration for the LAN brightness poller.
#[derive(Debug, Clone)]
pub struct BulbConfig {
    /// Network address of the bulb.
    pub addr: String,
    /// Timezone used to format log timestamps.
    pub timezone: Tz,
    /// Path of the brightness CSV log.
    pub log_path: String,
}

impl BulbConfig {
    /// Reads the configuration from the process environment.
    ///
    /// The bulb address defaults to [`DEFAULT_BULB_ADDR`] and can be
    /// overridden with `BULB_ADDR`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVar`] when `LOG_TIMEZONE` is set but
    /// not a valid IANA timezone name.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            addr: lookup("BULB_ADDR").unwrap_or_else(|| DEFAULT_BULB_ADDR.to_string()),
            timezone: timezone(&lookup)?,
            log_path: lookup("BRIGHTNESS_LOG_PATH")
                .unwrap_or_else(|| DEFAULT_BRIGHTNESS_LOG.to_string()),
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name).ok_or(ConfigError::MissingVar(name))
}

fn timezone(lookup: &impl Fn(&str) -> Option<String>) -> Result<Tz, ConfigError> {
    match lookup("LOG_TIMEZONE") {
        Some(name) => name.parse().map_err(|e| ConfigError::InvalidVar {
            name: "LOG_TIMEZONE",
            message: format!("{e}"),
        }),
        None => Ok(DEFAULT_TIMEZONE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn lookup(map: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        |name| map.get(name).cloned()
    }

    #[test]
    fn cloud_config_complete() {
        let map = env(&[
            ("API_ENDPOINT", "https://openapi.tuyaeu.com"),
            ("ACCESS_ID", "id"),
            ("ACCESS_KEY", "key"),
            ("DEVICE_ID", "dev123"),
        ]);

        let config = CloudConfig::from_lookup(lookup(&map)).unwrap();
        assert_eq!(config.api_endpoint, "https://openapi.tuyaeu.com");
        assert_eq!(config.device_id, "dev123");
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.log_path, DEFAULT_MOTION_LOG);
    }

    #[test]
    fn cloud_config_missing_var() {
        let map = env(&[
            ("API_ENDPOINT", "https://openapi.tuyaeu.com"),
            ("ACCESS_ID", "id"),
            ("ACCESS_KEY", "key"),
        ]);

        let err = CloudConfig::from_lookup(lookup(&map)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DEVICE_ID")));
    }

    #[test]
    fn bulb_config_defaults() {
        let map = env(&[]);
        let config = BulbConfig::from_lookup(lookup(&map)).unwrap();
        assert_eq!(config.addr, DEFAULT_BULB_ADDR);
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.log_path, DEFAULT_BRIGHTNESS_LOG);
    }

    #[test]
    fn bulb_config_overrides() {
        let map = env(&[
            ("BULB_ADDR", "10.0.0.7"),
            ("LOG_TIMEZONE", "Europe/Vienna"),
            ("BRIGHTNESS_LOG_PATH", "/tmp/bulb.csv"),
        ]);

        let config = BulbConfig::from_lookup(lookup(&map)).unwrap();
        assert_eq!(config.addr, "10.0.0.7");
        assert_eq!(config.timezone, chrono_tz::Europe::Vienna);
        assert_eq!(config.log_path, "/tmp/bulb.csv");
    }

    #[test]
    fn invalid_timezone_rejected() {
        let map = env(&[("LOG_TIMEZONE", "Mars/Olympus")]);
        let err = BulbConfig::from_lookup(lookup(&map)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar {
                name: "LOG_TIMEZONE",
                ..
            }
        ));
    }
}
