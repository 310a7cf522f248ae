// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Append-only CSV log writer.
//!
//! The log is the durable record of state transitions. The header is
//! written exactly once, when the file is first created; every logged
//! change opens the file in append mode, writes one row, flushes and
//! closes. Existing rows are never rewritten.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::LogError;

/// Append-only CSV log bound to one file path.
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    /// Opens the log, creating the file with a header row if it does not
    /// exist yet.
    ///
    /// Parent directories are created as needed. Re-opening an existing
    /// file never duplicates the header.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] when the file or its parent directory cannot
    /// be created or the header cannot be written.
    pub fn open(path: impl Into<PathBuf>, headers: &[&str]) -> Result<Self, LogError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        if !path.exists() {
            let file = OpenOptions::new().create_new(true).write(true).open(&path)?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(headers)?;
            writer.flush()?;
        }

        Ok(Self { path })
    }

    /// Appends exactly one row and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] when the file cannot be opened or the row
    /// cannot be written.
    pub fn append<I, F>(&self, row: I) -> Result<(), LogError>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }

    /// Returns the path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: &[&str] = &["local_timestamp", "brightness", "is_on"];

    #[test]
    fn creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulb.csv");

        let _log = CsvLog::open(&path, HEADERS).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "local_timestamp,brightness,is_on\n");
    }

    #[test]
    fn reopen_does_not_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulb.csv");

        let log = CsvLog::open(&path, HEADERS).unwrap();
        log.append(["2025-01-01 12:00:00", "10", "true"]).unwrap();

        // Second open must leave file contents untouched.
        let _log = CsvLog::open(&path, HEADERS).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "local_timestamp,brightness,is_on\n2025-01-01 12:00:00,10,true\n"
        );
    }

    #[test]
    fn append_adds_one_row_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulb.csv");

        let log = CsvLog::open(&path, HEADERS).unwrap();
        log.append(["2025-01-01 12:00:00", "10", "true"]).unwrap();
        log.append(["2025-01-01 12:00:03", "20", "false"]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.ends_with("2025-01-01 12:00:03,20,false\n"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("nested").join("bulb.csv");

        let _log = CsvLog::open(&path, HEADERS).unwrap();
        assert!(path.exists());
    }
}
