// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical field names and dynamically typed field values.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValueError;
use crate::translate::property;
use crate::types::{Celsius, HvacMode};

/// A field of the canonical device state.
///
/// Displays with the canonical camel-case name a host uses to address the
/// field, and parses from it.
///
/// # Examples
///
/// ```
/// use dreo_climate::state::Field;
///
/// let field: Field = "targetTemperatureC".parse().unwrap();
/// assert_eq!(field, Field::TargetTemperature);
/// assert!(field.is_writable());
/// assert!(!Field::CurrentTemperature.is_writable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    /// `powerOn`
    Power,
    /// `currentTemperatureC`, read-only.
    CurrentTemperature,
    /// `targetTemperatureC`
    TargetTemperature,
    /// `hvacMode`
    Mode,
    /// `fanSpeedPercent`
    FanSpeed,
    /// `swingEnabled`, optional capability.
    Swing,
}

impl Field {
    /// Every field, in display order.
    pub const ALL: [Self; 6] = [
        Self::Power,
        Self::CurrentTemperature,
        Self::TargetTemperature,
        Self::Mode,
        Self::FanSpeed,
        Self::Swing,
    ];

    /// Returns the canonical name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Power => "powerOn",
            Self::CurrentTemperature => "currentTemperatureC",
            Self::TargetTemperature => "targetTemperatureC",
            Self::Mode => "hvacMode",
            Self::FanSpeed => "fanSpeedPercent",
            Self::Swing => "swingEnabled",
        }
    }

    /// Returns the vendor property backing this field.
    #[must_use]
    pub const fn property(&self) -> &'static str {
        match self {
            Self::Power => property::POWER,
            Self::CurrentTemperature => property::CURRENT_TEMPERATURE,
            Self::TargetTemperature => property::TARGET_TEMPERATURE,
            Self::Mode => property::MODE,
            Self::FanSpeed => property::FAN_LEVEL,
            Self::Swing => property::SWING,
        }
    }

    /// Returns `true` if the field accepts writes.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        !matches!(self, Self::CurrentTemperature)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| ValueError::UnknownField(s.to_string()))
    }
}

/// A dynamically typed canonical value, as exchanged by `read` and `write`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Power or swing.
    Bool(bool),
    /// Temperatures in Celsius and fan speed in percent.
    Number(f64),
    /// Operating mode.
    Mode(HvacMode),
}

impl FieldValue {
    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the mode, if this is one.
    #[must_use]
    pub const fn as_mode(&self) -> Option<HvacMode> {
        match self {
            Self::Mode(m) => Some(*m),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Mode(m) => write!(f, "{m}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Celsius> for FieldValue {
    fn from(value: Celsius) -> Self {
        Self::Number(value.value())
    }
}

impl From<HvacMode> for FieldValue {
    fn from(value: HvacMode) -> Self {
        Self::Mode(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.to_string().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_field_name() {
        assert_eq!(
            "humidity".parse::<Field>(),
            Err(ValueError::UnknownField("humidity".to_string()))
        );
    }

    #[test]
    fn properties() {
        assert_eq!(Field::TargetTemperature.property(), "templevel");
        assert_eq!(Field::FanSpeed.property(), "windlevel");
        assert_eq!(Field::Swing.property(), "oscmode");
    }

    #[test]
    fn only_current_temperature_is_read_only() {
        let read_only: Vec<_> = Field::ALL.into_iter().filter(|f| !f.is_writable()).collect();
        assert_eq!(read_only, vec![Field::CurrentTemperature]);
    }

    #[test]
    fn value_accessors() {
        assert_eq!(FieldValue::from(true).as_bool(), Some(true));
        assert_eq!(FieldValue::from(60_u8).as_f64(), Some(60.0));
        assert_eq!(FieldValue::from(HvacMode::Dry).as_mode(), Some(HvacMode::Dry));
        assert_eq!(FieldValue::from(true).as_f64(), None);
    }

    #[test]
    fn value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&FieldValue::Number(21.5)).unwrap(), "21.5");
        assert_eq!(serde_json::to_string(&FieldValue::Bool(false)).unwrap(), "false");
    }
}
