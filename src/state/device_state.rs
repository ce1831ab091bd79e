// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical device state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::command::Intent;
use crate::types::{Celsius, HvacActivity, HvacMode};

use super::{Field, FieldValue};

/// Unit-correct view of a device, rebuilt on every successful fetch.
///
/// Immutable: refreshes and optimistic updates produce a new instance that
/// replaces the cached one whole. Temperatures are in Celsius with one
/// decimal; the fan speed is always one of the bucket table percentages.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use dreo_climate::command::Intent;
/// use dreo_climate::state::CanonicalDeviceState;
/// use dreo_climate::types::{Celsius, HvacActivity, HvacMode};
///
/// let state = CanonicalDeviceState::new(
///     true,
///     Celsius::from_fahrenheit(75.0),
///     Celsius::from_fahrenheit(68.0),
///     HvacMode::Cool,
///     60,
///     None,
///     Utc::now(),
/// );
/// assert_eq!(state.activity(), HvacActivity::Cooling);
///
/// let off = state.with_intent(&Intent::Power(false));
/// assert!(!off.power_on());
/// assert_eq!(off.activity(), HvacActivity::Inactive);
/// assert!(state.power_on());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalDeviceState {
    power_on: bool,
    #[serde(rename = "currentTemperatureC")]
    current_temperature: Celsius,
    #[serde(rename = "targetTemperatureC")]
    target_temperature: Celsius,
    hvac_mode: HvacMode,
    fan_speed_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    swing_enabled: Option<bool>,
    last_refreshed_at: DateTime<Utc>,
}

impl CanonicalDeviceState {
    /// Assembles a state from already validated parts.
    #[must_use]
    pub fn new(
        power_on: bool,
        current_temperature: Celsius,
        target_temperature: Celsius,
        hvac_mode: HvacMode,
        fan_speed_percent: u8,
        swing_enabled: Option<bool>,
        last_refreshed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            power_on,
            current_temperature,
            target_temperature,
            hvac_mode,
            fan_speed_percent,
            swing_enabled,
            last_refreshed_at,
        }
    }

    /// Whether the unit is powered on.
    #[must_use]
    pub fn power_on(&self) -> bool {
        self.power_on
    }

    /// Room temperature.
    #[must_use]
    pub fn current_temperature(&self) -> Celsius {
        self.current_temperature
    }

    /// Set point.
    #[must_use]
    pub fn target_temperature(&self) -> Celsius {
        self.target_temperature
    }

    /// Operating mode.
    #[must_use]
    pub fn mode(&self) -> HvacMode {
        self.hvac_mode
    }

    /// Fan speed as a bucket table percentage.
    #[must_use]
    pub fn fan_speed_percent(&self) -> u8 {
        self.fan_speed_percent
    }

    /// Oscillation, `None` if the device does not report it.
    #[must_use]
    pub fn swing_enabled(&self) -> Option<bool> {
        self.swing_enabled
    }

    /// When the state was last confirmed by a fetch.
    #[must_use]
    pub fn last_refreshed_at(&self) -> DateTime<Utc> {
        self.last_refreshed_at
    }

    /// Current activity derived from power and mode.
    #[must_use]
    pub fn activity(&self) -> HvacActivity {
        HvacActivity::derive(self.power_on, self.hvac_mode)
    }

    /// Returns `true` if more than `threshold` has elapsed since the last
    /// fetch.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        let threshold = TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(self.last_refreshed_at) > threshold
    }

    /// Returns the value of `field`, `None` only for an unreported swing.
    #[must_use]
    pub fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Power => Some(self.power_on.into()),
            Field::CurrentTemperature => Some(self.current_temperature.into()),
            Field::TargetTemperature => Some(self.target_temperature.into()),
            Field::Mode => Some(self.hvac_mode.into()),
            Field::FanSpeed => Some(self.fan_speed_percent.into()),
            Field::Swing => self.swing_enabled.map(FieldValue::from),
        }
    }

    /// Returns a copy with the intent applied.
    ///
    /// `last_refreshed_at` is kept: an optimistic value is not a
    /// confirmation from the device. Swing is only set if the device
    /// previously reported it.
    #[must_use]
    pub fn with_intent(&self, intent: &Intent) -> Self {
        let mut next = self.clone();
        match *intent {
            Intent::Power(on) => next.power_on = on,
            Intent::TargetTemperature(celsius) => next.target_temperature = celsius,
            Intent::Mode(mode) => next.hvac_mode = mode,
            Intent::FanSpeed(level) => next.fan_speed_percent = level.percent(),
            Intent::Swing(enabled) => {
                if next.swing_enabled.is_some() {
                    next.swing_enabled = Some(enabled);
                }
            }
        }
        next
    }
}

/// A cached state together with its freshness at the time of reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    /// The cached state.
    pub state: Arc<CanonicalDeviceState>,
    /// `true` if the state is older than the staleness threshold.
    pub is_stale: bool,
}
