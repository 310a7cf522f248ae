// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change-only brightness logger for the LAN smart bulb.
//!
//! Polls the bulb every 3 seconds and appends a row to the brightness CSV
//! whenever brightness or on/off state changed.

use std::time::Duration;

use hearthlog::{BulbConfig, BulbReading, CsvLog, HttpLightApi, Poller, Record, connect_light};

const POLL_INTERVAL: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> hearthlog::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = BulbConfig::from_env()?;

    println!("Change-only brightness logger running. Press Ctrl+C to stop.");

    let api = HttpLightApi::new(&config.addr)?;
    let sampler = connect_light(api, &config.addr).await?;
    let log = CsvLog::open(&config.log_path, BulbReading::headers())?;

    let poller = Poller::new(sampler, log, config.timezone, POLL_INTERVAL);

    tokio::select! {
        () = poller.run() => unreachable!("poll loop only ends on cancellation"),
        _ = tokio::signal::ctrl_c() => println!("Stopped."),
    }

    Ok(())
}
