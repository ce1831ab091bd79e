// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode types.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Canonical operating mode of the unit.
///
/// Independent of any host framework's numbering. Raw device codes:
///
/// | code | mode      |
/// |------|-----------|
/// | 1    | `Cool`    |
/// | 2    | `Dry`     |
/// | 3    | `FanOnly` |
/// | 5    | `Heat`    |
///
/// Code 5 is the unit's eco program, which is what the heat setting drives on
/// the models seen so far. Confirm against vendor documentation for other
/// models.
///
/// # Examples
///
/// ```
/// use dreo_climate::types::HvacMode;
///
/// assert_eq!(HvacMode::from_raw_code(3), Some(HvacMode::FanOnly));
/// assert_eq!(HvacMode::Heat.raw_code(), 5);
/// assert_eq!(HvacMode::from_raw_code(4), None);
/// assert_eq!("dry".parse::<HvacMode>().unwrap(), HvacMode::Dry);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    /// Cooling.
    Cool,
    /// Heating.
    Heat,
    /// Dehumidifying.
    Dry,
    /// Air circulation only.
    FanOnly,
}

impl HvacMode {
    /// Every canonical mode.
    pub const ALL: [Self; 4] = [Self::Cool, Self::Heat, Self::Dry, Self::FanOnly];

    /// Mode used when the device reports a code outside the declared table.
    pub const FALLBACK: Self = Self::Cool;

    /// Returns the raw device code for this mode.
    #[must_use]
    pub const fn raw_code(&self) -> i64 {
        match self {
            Self::Cool => 1,
            Self::Dry => 2,
            Self::FanOnly => 3,
            Self::Heat => 5,
        }
    }

    /// Looks up the mode for a raw device code.
    ///
    /// Returns `None` for codes outside the declared table.
    #[must_use]
    pub const fn from_raw_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Cool),
            2 => Some(Self::Dry),
            3 => Some(Self::FanOnly),
            5 => Some(Self::Heat),
            _ => None,
        }
    }

    /// Returns the lowercase name of this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cool => "cool",
            Self::Heat => "heat",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cool" => Ok(Self::Cool),
            "heat" => Ok(Self::Heat),
            "dry" | "dehumidify" => Ok(Self::Dry),
            "fan_only" | "fan" => Ok(Self::FanOnly),
            _ => Err(ValueError::UnknownMode(s.to_string())),
        }
    }
}

/// What the unit is doing right now, derived from power and mode.
///
/// Power off is always [`HvacActivity::Inactive`]; otherwise the activity
/// follows the mode, with fan-only reported as idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacActivity {
    /// Unit is off.
    Inactive,
    /// Unit is on but neither heating nor cooling.
    Idle,
    /// Unit is cooling.
    Cooling,
    /// Unit is heating.
    Heating,
    /// Unit is dehumidifying.
    Drying,
}

impl HvacActivity {
    /// Derives the activity from power state and mode.
    #[must_use]
    pub const fn derive(power_on: bool, mode: HvacMode) -> Self {
        if !power_on {
            return Self::Inactive;
        }
        match mode {
            HvacMode::Cool => Self::Cooling,
            HvacMode::Heat => Self::Heating,
            HvacMode::Dry => Self::Drying,
            HvacMode::FanOnly => Self::Idle,
        }
    }
}
