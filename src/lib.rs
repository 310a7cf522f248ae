// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hearthlog` - change-only CSV loggers for smart-home devices.
//!
//! Two independent pollers share one loop: fetch a normalized reading from
//! a vendor API, compare it field-wise against the last logged value, and
//! append a CSV row only on change.
//!
//! - **Brightness poller**: resolves a smart bulb on the LAN, reads its
//!   light capability and tracks brightness plus on/off state.
//! - **Motion poller**: queries a cloud IoT device-status endpoint and
//!   tracks the PIR (motion) entry plus the platform update timestamp.
//!
//! Transient failures inside the loop are warnings, not crashes; the fixed
//! poll interval doubles as the retry delay.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use hearthlog::{BulbConfig, BulbReading, CsvLog, HttpLightApi, Poller, Record};
//!
//! #[tokio::main]
//! async fn main() -> hearthlog::Result<()> {
//!     let config = BulbConfig::from_env()?;
//!     let api = HttpLightApi::new(&config.addr)?;
//!     let sampler = hearthlog::connect_light(api, &config.addr).await?;
//!     let log = CsvLog::open(&config.log_path, BulbReading::headers())?;
//!
//!     Poller::new(sampler, log, config.timezone, Duration::from_secs(3))
//!         .run()
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod cloud;
pub mod config;
pub mod error;
pub mod light;
pub mod log;
pub mod poller;
pub mod record;

pub use cloud::{CloudClient, DeviceStatus, MotionReading, MotionSampler, StatusEntry, pir_reading};
pub use config::{BulbConfig, CloudConfig};
pub use error::{ConfigError, DeviceError, Error, LogError, ParseError, ProtocolError, Result};
pub use light::{BulbReading, BulbSampler, Capabilities, HttpLightApi, LightApi, connect_light};
pub use log::CsvLog;
pub use poller::{ChangeTracker, PollOutcome, Poller, Sampler};
pub use record::Record;
