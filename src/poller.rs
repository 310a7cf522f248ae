// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The change-detection poll loop shared by both loggers.
//!
//! One iteration is fetch → compare-to-last → conditionally append → done.
//! Any failure inside an iteration is logged as a warning and treated as a
//! no-op: the last committed reading is left untouched, so the next
//! successful reading is still compared against the true last logged value.
//! The fixed poll interval is itself the retry delay; there is no backoff
//! growth and no retry limit.

use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::log::CsvLog;
use crate::record::Record;

/// Timestamp format used for all CSV columns and console lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of normalized readings, one per poll.
pub trait Sampler {
    /// The reading type this sampler produces.
    type Reading: Record;

    /// Fetches one normalized reading from the underlying device API.
    ///
    /// # Errors
    ///
    /// Any [`Error`] returned here is recoverable: the poller warns and
    /// retries on the next tick.
    async fn sample(&mut self) -> Result<Self::Reading>;
}

/// Last-seen state for change-only logging.
///
/// Starts unset, so the first successful reading always counts as changed.
/// State is committed only after its row is durably appended.
#[derive(Debug)]
pub struct ChangeTracker<R: PartialEq> {
    last: Option<R>,
}

impl<R: PartialEq> ChangeTracker<R> {
    /// Creates a tracker with no prior reading.
    #[must_use]
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Returns whether `reading` differs from the last committed reading.
    pub fn changed(&self, reading: &R) -> bool {
        self.last.as_ref() != Some(reading)
    }

    /// Records `reading` as the last logged value.
    pub fn commit(&mut self, reading: R) {
        self.last = Some(reading);
    }

    /// Returns the last committed reading, if any.
    pub fn last(&self) -> Option<&R> {
        self.last.as_ref()
    }
}

impl<R: PartialEq> Default for ChangeTracker<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a single poll iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The reading differed from the last logged one and a row was appended.
    Logged,
    /// The reading matched the last logged one; nothing was written.
    Unchanged,
    /// The iteration failed; last-seen state was left untouched.
    Failed,
}

/// Single-threaded cooperative poll loop over one sampler and one CSV log.
#[derive(Debug)]
pub struct Poller<S: Sampler> {
    sampler: S,
    tracker: ChangeTracker<S::Reading>,
    log: CsvLog,
    timezone: Tz,
    interval: Duration,
}

impl<S: Sampler> Poller<S> {
    /// Creates a poller with an unset last-seen state.
    #[must_use]
    pub fn new(sampler: S, log: CsvLog, timezone: Tz, interval: Duration) -> Self {
        Self {
            sampler,
            tracker: ChangeTracker::new(),
            log,
            timezone,
            interval,
        }
    }

    /// Runs exactly one iteration: sample, compare, conditionally append.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let reading = match self.sampler.sample().await {
            Ok(reading) => reading,
            Err(error) => {
                warn_iteration(&error);
                return PollOutcome::Failed;
            }
        };

        if !self.tracker.changed(&reading) {
            return PollOutcome::Unchanged;
        }

        let timestamp = Utc::now()
            .with_timezone(&self.timezone)
            .format(TIMESTAMP_FORMAT)
            .to_string();

        println!("[{timestamp}] {}", reading.describe());

        if let Err(error) = self.log.append(reading.fields(&timestamp)) {
            warn_iteration(&error.into());
            return PollOutcome::Failed;
        }

        self.tracker.commit(reading);
        PollOutcome::Logged
    }

    /// Runs the loop forever: poll, sleep the fixed interval, repeat.
    ///
    /// Only external cancellation (dropping the future, e.g. via
    /// `tokio::select!` with a Ctrl-C signal) ends the loop.
    pub async fn run(mut self) {
        loop {
            self.poll_once().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}

fn warn_iteration(error: &Error) {
    tracing::warn!(error = %error, "poll iteration failed, retrying on next tick");
}
