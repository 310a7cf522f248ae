// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability registry over a raw device state payload.
//!
//! Callers ask for a capability by name; the registry owns the mapping to
//! the version-specific keys under which firmware revisions expose it.

use serde_json::Value;

/// Name of the light capability.
pub const LIGHT: &str = "light";

/// Keys under which firmware revisions expose the light capability.
/// Tried in order; the first object-valued hit wins.
const LIGHT_KEYS: &[&str] = &[
    "light",
    "light_state",
    "smartlife.iot.smartbulb.lightingservice",
];

/// Read-only capability lookup over one state payload.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities<'a> {
    state: &'a Value,
}

impl<'a> Capabilities<'a> {
    /// Wraps a raw state payload.
    #[must_use]
    pub fn new(state: &'a Value) -> Self {
        Self { state }
    }

    /// Looks up a named capability.
    ///
    /// For [`LIGHT`], the version-specific keys are tried in order. As a
    /// last resort a flat payload that carries a `brightness` field at the
    /// top level is treated as the light capability itself.
    #[must_use]
    pub fn capability(&self, name: &str) -> Option<&'a Value> {
        if name != LIGHT {
            return None;
        }

        let object = self.state.as_object()?;

        for key in LIGHT_KEYS {
            if let Some(value) = object.get(*key)
                && value.is_object()
            {
                return Some(value);
            }
        }

        if object.contains_key("brightness") {
            return Some(self.state);
        }

        None
    }

    /// Returns the top-level keys of the payload, for error reporting.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.state
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_light_under_module_key() {
        let state = json!({ "light": { "brightness": 50 } });
        let caps = Capabilities::new(&state);
        assert_eq!(caps.capability(LIGHT), Some(&json!({ "brightness": 50 })));
    }

    #[test]
    fn finds_light_under_versioned_service_key() {
        let state = json!({
            "smartlife.iot.smartbulb.lightingservice": { "brightness": 75, "on_off": 1 }
        });
        let caps = Capabilities::new(&state);
        let light = caps.capability(LIGHT).unwrap();
        assert_eq!(light["brightness"], 75);
    }

    #[test]
    fn earlier_keys_win() {
        let state = json!({
            "light": { "brightness": 10 },
            "light_state": { "brightness": 99 }
        });
        let caps = Capabilities::new(&state);
        assert_eq!(caps.capability(LIGHT).unwrap()["brightness"], 10);
    }

    #[test]
    fn flat_payload_is_its_own_light_capability() {
        let state = json!({ "brightness": 30, "is_on": false });
        let caps = Capabilities::new(&state);
        assert_eq!(caps.capability(LIGHT), Some(&state));
    }

    #[test]
    fn non_object_key_is_skipped() {
        // "light" holding a scalar is not a capability object.
        let state = json!({ "light": "on", "light_state": { "brightness": 5 } });
        let caps = Capabilities::new(&state);
        assert_eq!(caps.capability(LIGHT).unwrap()["brightness"], 5);
    }

    #[test]
    fn missing_capability_returns_none() {
        let state = json!({ "energy": { "power_w": 9 } });
        let caps = Capabilities::new(&state);
        assert!(caps.capability(LIGHT).is_none());
        assert_eq!(caps.names(), vec!["energy".to_string()]);
    }

    #[test]
    fn unknown_capability_name_returns_none() {
        let state = json!({ "light": { "brightness": 50 } });
        let caps = Capabilities::new(&state);
        assert!(caps.capability("energy").is_none());
    }

    #[test]
    fn non_object_payload_has_no_capabilities() {
        let state = json!([1, 2, 3]);
        let caps = Capabilities::new(&state);
        assert!(caps.capability(LIGHT).is_none());
        assert!(caps.names().is_empty());
    }
}
