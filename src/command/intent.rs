// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated write intents.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, MalformedStateError, ValueError};
use crate::event::DeviceId;
use crate::state::{CanonicalDeviceState, Field, FieldValue};
use crate::translate::RawCommand;
use crate::types::{Celsius, FanLevel, HvacMode, percent_to_level, round_half_up};

/// A desired value for one writable field, already validated.
///
/// # Examples
///
/// ```
/// use dreo_climate::command::Intent;
/// use dreo_climate::state::{Field, FieldValue};
///
/// let intent = Intent::new(Field::FanSpeed, FieldValue::Number(40.0)).unwrap();
/// let command = intent.to_raw_command();
/// assert_eq!(command.property, "windlevel");
/// assert_eq!(command.payload, serde_json::json!({"state": 2}));
///
/// assert!(Intent::new(Field::FanSpeed, FieldValue::Number(-5.0)).is_err());
/// assert!(Intent::new(Field::CurrentTemperature, FieldValue::Number(20.0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Turn the unit on or off.
    Power(bool),
    /// Change the set point.
    TargetTemperature(Celsius),
    /// Change the operating mode.
    Mode(HvacMode),
    /// Change the fan speed, bucketed to a device level.
    FanSpeed(FanLevel),
    /// Enable or disable oscillation.
    Swing(bool),
}

impl Intent {
    /// Validates `value` for `field`.
    ///
    /// Fan speeds are rounded half-up to a whole percent and bucketed.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnlyField`] for `currentTemperatureC`
    /// - [`ValueError::FieldMismatch`] if the value has the wrong kind
    /// - [`MalformedStateError`] naming the field if the value is out of
    ///   domain
    pub fn new(field: Field, value: FieldValue) -> Result<Self, Error> {
        match (field, value) {
            (Field::CurrentTemperature, _) => Err(Error::ReadOnlyField(field)),
            (Field::Power, FieldValue::Bool(on)) => Ok(Self::Power(on)),
            (Field::Swing, FieldValue::Bool(on)) => Ok(Self::Swing(on)),
            (Field::Mode, FieldValue::Mode(mode)) => Ok(Self::Mode(mode)),
            (Field::TargetTemperature, FieldValue::Number(celsius)) => Celsius::new(celsius)
                .map(Self::TargetTemperature)
                .map_err(|_| Error::from(MalformedStateError::out_of_range(field.name(), celsius))),
            (Field::FanSpeed, FieldValue::Number(percent)) => {
                fan_level(percent).map(Self::FanSpeed).ok_or_else(|| {
                    Error::from(MalformedStateError::out_of_range(field.name(), percent))
                })
            }
            (Field::Power | Field::Swing, _) => Err(mismatch(field, "boolean")),
            (Field::Mode, _) => Err(mismatch(field, "mode")),
            (Field::TargetTemperature | Field::FanSpeed, _) => Err(mismatch(field, "numeric")),
        }
    }

    /// Returns the field this intent writes.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Power(_) => Field::Power,
            Self::TargetTemperature(_) => Field::TargetTemperature,
            Self::Mode(_) => Field::Mode,
            Self::FanSpeed(_) => Field::FanSpeed,
            Self::Swing(_) => Field::Swing,
        }
    }

    /// Returns the canonical value this intent sets.
    #[must_use]
    pub fn value(&self) -> FieldValue {
        match *self {
            Self::Power(on) | Self::Swing(on) => on.into(),
            Self::TargetTemperature(celsius) => celsius.into(),
            Self::Mode(mode) => mode.into(),
            Self::FanSpeed(level) => level.percent().into(),
        }
    }

    /// Builds the device command for this intent.
    #[must_use]
    pub fn to_raw_command(&self) -> RawCommand {
        match *self {
            Self::Power(on) => RawCommand::power(on),
            Self::TargetTemperature(celsius) => RawCommand::target_temperature(celsius),
            Self::Mode(mode) => RawCommand::mode(mode),
            Self::FanSpeed(level) => RawCommand::fan_level(level),
            Self::Swing(on) => RawCommand::swing(on),
        }
    }
}

fn mismatch(field: Field, expected: &'static str) -> Error {
    ValueError::FieldMismatch { field, expected }.into()
}

#[allow(clippy::cast_possible_truncation)]
fn fan_level(percent: f64) -> Option<FanLevel> {
    if !percent.is_finite() {
        return None;
    }
    // Bounded to [0, 100] by percent_to_level after the cast
    let rounded = round_half_up(percent).clamp(-1.0, 101.0) as i64;
    percent_to_level(rounded).ok()
}

/// A write that has been accepted for dispatch. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingIntent {
    /// Correlates log lines and the resulting [`Ack`].
    pub id: Uuid,
    /// Target device.
    pub device_id: DeviceId,
    /// The validated intent.
    pub intent: Intent,
    /// When the write was issued.
    pub issued_at: DateTime<Utc>,
}

impl PendingIntent {
    /// Creates a pending intent with a fresh ID.
    #[must_use]
    pub fn new(device_id: DeviceId, intent: Intent, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id,
            intent,
            issued_at,
        }
    }
}

/// Acknowledgement of a write accepted by the remote side.
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    /// ID of the [`PendingIntent`] that was dispatched.
    pub intent_id: Uuid,
    /// Target device.
    pub device_id: DeviceId,
    /// The field that was written.
    pub field: Field,
    /// The optimistic state now cached, `None` if the device was never
    /// fetched.
    pub state: Option<Arc<CanonicalDeviceState>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn read_only_field() {
        assert_eq!(
            Intent::new(Field::CurrentTemperature, FieldValue::Number(21.0)),
            Err(Error::ReadOnlyField(Field::CurrentTemperature))
        );
    }

    #[test]
    fn wrong_value_kind() {
        assert!(matches!(
            Intent::new(Field::Power, FieldValue::Number(1.0)),
            Err(Error::Value(ValueError::FieldMismatch {
                field: Field::Power,
                ..
            }))
        ));
        assert!(matches!(
            Intent::new(Field::Mode, FieldValue::Bool(true)),
            Err(Error::Value(ValueError::FieldMismatch { .. }))
        ));
    }

    #[test]
    fn out_of_domain_target_names_field() {
        for bad in [f64::NAN, 75.0, -50.0] {
            let Err(Error::Malformed(err)) =
                Intent::new(Field::TargetTemperature, FieldValue::Number(bad))
            else {
                panic!("{bad} should be rejected");
            };
            assert_eq!(err.field(), "targetTemperatureC");
        }
    }

    #[test]
    fn negative_fan_percent_is_malformed() {
        let Err(Error::Malformed(err)) = Intent::new(Field::FanSpeed, FieldValue::Number(-1.0))
        else {
            panic!("negative percent accepted");
        };
        assert_eq!(err.field(), "fanSpeedPercent");
        assert!(Intent::new(Field::FanSpeed, FieldValue::Number(100.4)).is_ok());
        assert!(Intent::new(Field::FanSpeed, FieldValue::Number(100.5)).is_err());
    }

    #[test]
    fn fan_percent_is_bucketed() {
        let cases = [(0.0, 1), (24.4, 1), (24.5, 2), (49.0, 2), (50.0, 3), (75.0, 4), (100.0, 4)];
        for (percent, level) in cases {
            let intent = Intent::new(Field::FanSpeed, FieldValue::Number(percent)).unwrap();
            assert_eq!(intent, Intent::FanSpeed(FanLevel::new(level).unwrap()), "{percent}");
        }
    }

    #[test]
    fn target_rounds_to_tenths() {
        let intent = Intent::new(Field::TargetTemperature, FieldValue::Number(21.46)).unwrap();
        assert_eq!(intent.value(), FieldValue::Number(21.5));
    }

    #[test]
    fn commands() {
        let intent = Intent::new(Field::Mode, FieldValue::Mode(HvacMode::Heat)).unwrap();
        let command = intent.to_raw_command();
        assert_eq!(command.property, "mode");
        assert_eq!(command.payload, json!({"state": 5}));

        let command = Intent::Swing(false).to_raw_command();
        assert_eq!(command.payload, json!({"state": false}));
    }

    #[test]
    fn commands_target_the_field_property() {
        let intents = [
            Intent::Power(true),
            Intent::TargetTemperature(Celsius::from_fahrenheit(70.0)),
            Intent::Mode(HvacMode::Dry),
            Intent::FanSpeed(FanLevel::HIGH),
            Intent::Swing(true),
        ];
        let properties: Vec<_> = intents
            .iter()
            .map(|intent| intent.to_raw_command().property)
            .collect();
        assert_eq!(
            properties,
            vec!["poweron", "templevel", "mode", "windlevel", "oscmode"]
        );
        for intent in intents {
            assert_eq!(intent.to_raw_command().property, intent.field().property());
        }
    }

    #[test]
    fn pending_intents_have_distinct_ids() {
        let id = DeviceId::new("AC-1");
        let a = PendingIntent::new(id.clone(), Intent::Power(true), Utc::now());
        let b = PendingIntent::new(id, Intent::Power(true), Utc::now());
        assert_ne!(a.id, b.id);
    }
}
