// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change-only motion logger for the cloud PIR sensor.
//!
//! Polls the device-status endpoint every 2 seconds and appends a row to
//! the motion CSV whenever the PIR status or the platform update timestamp
//! changed.

use std::time::Duration;

use hearthlog::{CloudClient, CloudConfig, CsvLog, MotionReading, MotionSampler, Poller, Record};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> hearthlog::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = CloudConfig::from_env()?;

    let mut client = CloudClient::new(&config)?;
    client.connect().await?;

    println!("Change-only motion logger running. Press Ctrl+C to stop.");

    let sampler = MotionSampler::new(client, &config);
    let log = CsvLog::open(&config.log_path, MotionReading::headers())?;

    let poller = Poller::new(sampler, log, config.timezone, POLL_INTERVAL);

    tokio::select! {
        () = poller.run() => unreachable!("poll loop only ends on cancellation"),
        _ = tokio::signal::ctrl_c() => println!("Stopped."),
    }

    Ok(())
}
