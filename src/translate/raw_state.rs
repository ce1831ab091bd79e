// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw device state as reported by the vendor cloud.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::MalformedStateError;

/// Vendor property names.
pub mod property {
    /// Power on/off (bool, sometimes 0/1).
    pub const POWER: &str = "poweron";
    /// Operating mode code.
    pub const MODE: &str = "mode";
    /// Current room temperature in Fahrenheit.
    pub const CURRENT_TEMPERATURE: &str = "temperature";
    /// Target temperature in Fahrenheit.
    pub const TARGET_TEMPERATURE: &str = "templevel";
    /// Fan level 1-4.
    pub const FAN_LEVEL: &str = "windlevel";
    /// Oscillation on/off, not reported by every model.
    pub const SWING: &str = "oscmode";
}

/// Untyped device state: property name to `{"state": value}`.
///
/// Nothing is validated here, not even the wrapper shape: the vendor blob
/// also carries unrelated entries (names, nested settings). Values are
/// checked when the state is translated into a
/// [`CanonicalDeviceState`](crate::state::CanonicalDeviceState), and only
/// for the properties translation reads.
///
/// # Examples
///
/// ```
/// use dreo_climate::translate::RawDeviceState;
/// use serde_json::json;
///
/// let raw: RawDeviceState = serde_json::from_value(json!({
///     "poweron": {"state": true},
///     "templevel": {"state": 68},
///     "deviceName": "Bedroom AC"
/// })).unwrap();
///
/// assert_eq!(raw.get("templevel"), Some(&json!(68)));
/// assert!(raw.get("mode").is_none());
/// assert!(raw.lookup("deviceName").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDeviceState {
    properties: HashMap<String, Value>,
}

impl RawDeviceState {
    /// Creates an empty raw state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state with `property` set to `value`.
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(property, value);
        self
    }

    /// Sets `property` to `value`, replacing any previous value.
    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        let value: Value = value.into();
        self.properties
            .insert(property.into(), json!({ "state": value }));
    }

    /// Returns the value of `property`, if present and wrapped as
    /// `{"state": value}`.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)?.get("state")
    }

    /// Returns the value of `property`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedStateError`] naming the property if it is present
    /// but not wrapped as `{"state": value}`.
    pub fn lookup(&self, property: &str) -> Result<Option<&Value>, MalformedStateError> {
        let Some(wrapper) = self.properties.get(property) else {
            return Ok(None);
        };
        wrapper.get("state").map(Some).ok_or_else(|| {
            MalformedStateError::wrong_type(property, "{\"state\": value} wrapper", wrapper)
        })
    }

    /// Sets `property` to an arbitrary unwrapped entry, as the vendor blob
    /// sometimes carries.
    pub fn insert_raw(&mut self, property: impl Into<String>, entry: impl Into<Value>) {
        self.properties.insert(property.into(), entry.into());
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no property is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_vendor_shape() {
        let raw: RawDeviceState = serde_json::from_value(json!({
            "poweron": {"state": true},
            "mode": {"state": 1},
            "windlevel": {"state": 3}
        }))
        .unwrap();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.get(property::POWER), Some(&json!(true)));
        assert_eq!(raw.get(property::FAN_LEVEL), Some(&json!(3)));
    }

    #[test]
    fn builder_overwrites() {
        let raw = RawDeviceState::new()
            .with(property::MODE, 1)
            .with(property::MODE, 2);
        assert_eq!(raw.get(property::MODE), Some(&json!(2)));
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn unrelated_entries_are_kept_but_ignored() {
        let raw: RawDeviceState = serde_json::from_value(json!({
            "poweron": {"state": true},
            "deviceName": "Bedroom AC",
            "schedule": {"enabled": false}
        }))
        .unwrap();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.get(property::POWER), Some(&json!(true)));
        assert_eq!(raw.get("deviceName"), None);
        assert_eq!(raw.get("schedule"), None);
    }

    #[test]
    fn lookup_reports_unwrapped_entry() {
        let mut raw = RawDeviceState::new().with(property::MODE, 1);
        raw.insert_raw(property::POWER, json!({"value": true}));

        assert_eq!(raw.lookup(property::MODE), Ok(Some(&json!(1))));
        assert_eq!(raw.lookup(property::FAN_LEVEL), Ok(None));

        let err = raw.lookup(property::POWER).unwrap_err();
        assert_eq!(err.field(), property::POWER);
    }

    #[test]
    fn serializes_wrapped() {
        let raw = RawDeviceState::new().with(property::TARGET_TEMPERATURE, 70);
        assert_eq!(
            serde_json::to_value(&raw).unwrap(),
            json!({"templevel": {"state": 70}})
        );
    }

    #[test]
    fn empty_state() {
        assert!(RawDeviceState::new().is_empty());
    }
}
