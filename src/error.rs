// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hearthlog` loggers.
//!
//! Errors fall into two tiers. Configuration and device-setup failures are
//! fatal and stop the process before the poll loop starts. Everything raised
//! inside a single poll iteration (protocol, parse, log I/O) is recoverable:
//! the poller logs a warning and retries on the next tick.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration (fatal at startup).
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Error occurred while writing the CSV log.
    #[error("log error: {0}")]
    Log(#[from] LogError),
}

/// Errors related to environment-derived configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidVar {
        /// The environment variable name.
        name: &'static str,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to protocol communication with the vendor APIs.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the device or cloud endpoint failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication with the cloud API failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The client has no active session.
    #[error("client is not connected")]
    NotConnected,
}

/// Errors related to parsing device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No device responded at the configured address.
    #[error("no device found at {0}")]
    NotFound(String),

    /// The device state exposes no recognized light capability.
    #[error("device at {addr} has no light capability (found: {found:?})")]
    NoLightCapability {
        /// The device address.
        addr: String,
        /// Capability names the device did expose.
        found: Vec<String>,
    },

    /// The cloud API returned an unsuccessful envelope.
    #[error("cloud API rejected the request: {msg} (code {code})")]
    Rejected {
        /// Vendor error code.
        code: i64,
        /// Vendor error message.
        msg: String,
    },
}

/// Errors related to the CSV log file.
#[derive(Debug, Error)]
pub enum LogError {
    /// Filesystem operation on the log file failed.
    #[error("log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// CSV row could not be written.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
