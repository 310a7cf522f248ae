// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field extraction from the light capability payload.
//!
//! Firmware revisions expose brightness and on/off either as named
//! attributes or nested inside a state block, so each field is read through
//! an ordered list of strategies; the first hit wins. Brightness entirely
//! absent is a recoverable error, on/off always resolves (worst case from
//! `brightness > 0`).

use serde_json::Value;

use super::BulbReading;
use crate::error::ParseError;

/// Normalizes one light capability payload into a [`BulbReading`].
///
/// # Errors
///
/// Returns [`ParseError::MissingField`] when no extraction strategy yields
/// a brightness value.
pub fn read_light(light: &Value) -> Result<BulbReading, ParseError> {
    let brightness = extract_brightness(light)?;
    let is_on = extract_is_on(light, brightness);
    Ok(BulbReading { brightness, is_on })
}

fn extract_brightness(light: &Value) -> Result<i64, ParseError> {
    light
        .get("brightness")
        .and_then(Value::as_i64)
        .or_else(|| nested(light, "state", "brightness").and_then(Value::as_i64))
        .or_else(|| nested(light, "dft_on_state", "brightness").and_then(Value::as_i64))
        .ok_or_else(|| ParseError::MissingField("brightness".to_string()))
}

fn extract_is_on(light: &Value, brightness: i64) -> bool {
    let candidate = light
        .get("is_on")
        .or_else(|| nested(light, "state", "light_on"))
        .or_else(|| nested(light, "state", "is_on"))
        .or_else(|| light.get("on_off"));

    match candidate {
        Some(value) => coerce_on_off(value, brightness),
        None => brightness > 0,
    }
}

fn nested<'a>(value: &'a Value, outer: &str, inner: &str) -> Option<&'a Value> {
    value.get(outer).and_then(|v| v.get(inner))
}

/// Coerces a loosely-typed on/off value into a boolean.
///
/// Booleans pass through, numbers are non-zero tests, and recognized string
/// tokens map directly ("true"/"1"/"on" and "false"/"0"/"off", case
/// insensitive). Anything else falls back to `brightness > 0`.
#[must_use]
pub fn coerce_on_off(value: &Value, brightness: i64) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => true,
            "false" | "0" | "off" => false,
            _ => brightness > 0,
        },
        _ => brightness > 0,
    }
}
