// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw to canonical translation and canonical to raw command payloads.
//!
//! Everything here is pure: no I/O and no shared state. Out-of-domain input
//! fails with [`MalformedStateError`] naming the raw property. The only
//! tolerated irregularity is an undeclared mode code, which falls back to
//! [`HvacMode::FALLBACK`] and records a [`TranslationMiss`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::MalformedStateError;
use crate::state::{CanonicalDeviceState, Field};
use crate::types::{
    Celsius, FanLevel, HvacMode, MAX_FAHRENHEIT, MIN_FAHRENHEIT, level_to_percent,
};

use super::raw_state::{RawDeviceState, property};

/// A raw value with no declared canonical translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationMiss {
    /// The vendor property that carried the value.
    pub property: &'static str,
    /// The value as reported.
    pub raw: Value,
}

/// Result of translating a raw state.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// The canonical state.
    pub state: CanonicalDeviceState,
    /// Fallbacks used while translating, at most one per property.
    pub misses: Vec<TranslationMiss>,
}

/// A command ready to be handed to the transport.
///
/// The payload always has the `{"state": value}` shape the vendor API
/// expects.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCommand {
    /// The vendor property to set.
    pub property: &'static str,
    /// The command payload.
    pub payload: Value,
}

impl RawCommand {
    fn new(field: Field, value: impl Into<Value>) -> Self {
        let value: Value = value.into();
        Self {
            property: field.property(),
            payload: json!({ "state": value }),
        }
    }

    /// Command setting power on or off.
    #[must_use]
    pub fn power(on: bool) -> Self {
        Self::new(Field::Power, on)
    }

    /// Command setting the target temperature.
    ///
    /// The device takes whole degrees Fahrenheit.
    #[must_use]
    pub fn target_temperature(celsius: Celsius) -> Self {
        Self::new(Field::TargetTemperature, celsius.to_fahrenheit())
    }

    /// Command setting the operating mode.
    #[must_use]
    pub fn mode(mode: HvacMode) -> Self {
        canonical_mode_to_raw(mode)
    }

    /// Command setting the fan level.
    #[must_use]
    pub fn fan_level(level: FanLevel) -> Self {
        Self::new(Field::FanSpeed, level.value())
    }

    /// Command enabling or disabling oscillation.
    #[must_use]
    pub fn swing(enabled: bool) -> Self {
        Self::new(Field::Swing, enabled)
    }

    /// Returns the value inside the `{"state": value}` payload.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.payload.get("state")
    }
}

/// Translates a raw state into a canonical state stamped `refreshed_at`.
///
/// # Errors
///
/// Returns [`MalformedStateError`] naming the first property that is
/// missing, of the wrong type, or outside its domain.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use dreo_climate::translate::{RawDeviceState, translate};
/// use dreo_climate::types::HvacMode;
///
/// let raw = RawDeviceState::new()
///     .with("poweron", true)
///     .with("mode", 1)
///     .with("temperature", 75)
///     .with("templevel", 68)
///     .with("windlevel", 3);
///
/// let translation = translate(&raw, Utc::now()).unwrap();
/// let state = translation.state;
/// assert!(state.power_on());
/// assert_eq!(state.mode(), HvacMode::Cool);
/// assert_eq!(state.current_temperature().value(), 23.9);
/// assert_eq!(state.target_temperature().value(), 20.0);
/// assert_eq!(state.fan_speed_percent(), 60);
/// ```
pub fn translate(
    raw: &RawDeviceState,
    refreshed_at: DateTime<Utc>,
) -> Result<Translation, MalformedStateError> {
    let mut misses = Vec::new();

    let power_on = decode_bool(raw, property::POWER)?;
    let mode = raw_mode_to_canonical(decode_integer(raw, property::MODE)?, &mut misses);
    let current = decode_temperature(raw, property::CURRENT_TEMPERATURE)?;
    let target = decode_temperature(raw, property::TARGET_TEMPERATURE)?;
    let fan_level = decode_fan_level(raw)?;
    let swing = decode_optional_switch(raw, property::SWING)?;

    let state = CanonicalDeviceState::new(
        power_on,
        current,
        target,
        mode,
        level_to_percent(fan_level),
        swing,
        refreshed_at,
    );

    Ok(Translation { state, misses })
}

/// Maps a raw mode code to the canonical mode.
///
/// Total: undeclared codes map to [`HvacMode::FALLBACK`] and push exactly one
/// [`TranslationMiss`] onto `misses`.
pub fn raw_mode_to_canonical(code: i64, misses: &mut Vec<TranslationMiss>) -> HvacMode {
    HvacMode::from_raw_code(code).unwrap_or_else(|| {
        warn!(code, fallback = %HvacMode::FALLBACK, "Undeclared mode code");
        misses.push(TranslationMiss {
            property: property::MODE,
            raw: Value::from(code),
        });
        HvacMode::FALLBACK
    })
}

/// Builds the command that sets `mode` on the device.
#[must_use]
pub fn canonical_mode_to_raw(mode: HvacMode) -> RawCommand {
    RawCommand::new(Field::Mode, mode.raw_code())
}

fn require<'a>(raw: &'a RawDeviceState, name: &'static str) -> Result<&'a Value, MalformedStateError> {
    match raw.lookup(name)? {
        None | Some(Value::Null) => Err(MalformedStateError::missing(name)),
        Some(value) => Ok(value),
    }
}

fn as_switch(value: &Value, name: &'static str) -> Result<bool, MalformedStateError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(MalformedStateError::out_of_range(name, n)),
        },
        other => Err(MalformedStateError::wrong_type(name, "boolean", other)),
    }
}

fn decode_bool(raw: &RawDeviceState, name: &'static str) -> Result<bool, MalformedStateError> {
    as_switch(require(raw, name)?, name)
}

fn decode_optional_switch(
    raw: &RawDeviceState,
    name: &'static str,
) -> Result<Option<bool>, MalformedStateError> {
    match raw.lookup(name)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            // Some models report an oscillation pattern code; any non-zero means on
            Some(code) => Ok(Some(code != 0)),
            None => Err(MalformedStateError::wrong_type(name, "boolean", n)),
        },
        Some(value) => as_switch(value, name).map(Some),
    }
}

fn decode_integer(raw: &RawDeviceState, name: &'static str) -> Result<i64, MalformedStateError> {
    let value = require(raw, name)?;
    value
        .as_i64()
        .ok_or_else(|| MalformedStateError::wrong_type(name, "integer", value))
}

fn decode_temperature(
    raw: &RawDeviceState,
    name: &'static str,
) -> Result<Celsius, MalformedStateError> {
    let value = require(raw, name)?;
    let fahrenheit = value
        .as_f64()
        .ok_or_else(|| MalformedStateError::wrong_type(name, "number", value))?;

    if !(MIN_FAHRENHEIT..=MAX_FAHRENHEIT).contains(&fahrenheit) {
        return Err(MalformedStateError::out_of_range(name, fahrenheit));
    }

    Ok(Celsius::from_fahrenheit(fahrenheit))
}

fn decode_fan_level(raw: &RawDeviceState) -> Result<FanLevel, MalformedStateError> {
    let name = property::FAN_LEVEL;
    let level = decode_integer(raw, name)?;
    u8::try_from(level)
        .ok()
        .and_then(|l| FanLevel::new(l).ok())
        .ok_or_else(|| MalformedStateError::out_of_range(name, level))
}
