// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized device readings that can be written as CSV rows.

/// A normalized snapshot of one poll that knows its CSV representation.
///
/// Equality is field-wise and drives change detection: a row is appended
/// only when the current reading differs from the last committed one.
pub trait Record: PartialEq + Sized {
    /// Header row written when the log file is first created.
    fn headers() -> &'static [&'static str];

    /// CSV fields for this reading, led by the local wall-clock timestamp.
    fn fields(&self, local_timestamp: &str) -> Vec<String>;

    /// One-line console summary printed when the reading is logged.
    fn describe(&self) -> String;
}
