// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan level type and the level/percentage bucket table.
//!
//! The device exposes four discrete fan levels (`windlevel` 1-4). Hosts
//! speak in percentages. The mapping is a single fixed table:
//!
//! | level | percent | accepted percent range |
//! |-------|---------|------------------------|
//! | 1     | 10      | 0-24                   |
//! | 2     | 35      | 25-49                  |
//! | 3     | 60      | 50-74                  |
//! | 4     | 90      | 75-100                 |
//!
//! Each level's percentage lies inside its own bucket, so translating a
//! percentage to a level and back always lands on a fixed point.

use std::fmt;

use crate::error::ValueError;

/// Representative percentage for each level, indexed by `level - 1`.
const LEVEL_PERCENT: [u8; 4] = [10, 35, 60, 90];

/// Exclusive upper percentage bound of each of the first three buckets.
const BUCKET_UPPER: [u8; 3] = [25, 50, 75];

/// A discrete device fan level (1-4).
///
/// # Examples
///
/// ```
/// use dreo_climate::types::FanLevel;
///
/// let level = FanLevel::from_percent(70).unwrap();
/// assert_eq!(level.value(), 3);
/// assert_eq!(level.percent(), 60);
///
/// assert!(FanLevel::new(5).is_err());
/// assert!(FanLevel::from_percent(101).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct FanLevel(u8);

impl FanLevel {
    /// Lowest device level.
    pub const MIN: u8 = 1;

    /// Highest device level.
    pub const MAX: u8 = 4;

    /// Lowest fan speed.
    pub const LOW: Self = Self(1);

    /// Highest fan speed.
    pub const HIGH: Self = Self(4);

    /// Creates a fan level from a device level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the level is not in 1-4.
    pub fn new(level: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(ValueError::OutOfRange {
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                actual: i64::from(level),
            });
        }
        Ok(Self(level))
    }

    /// Selects the level whose bucket contains `percent`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `percent` exceeds 100.
    pub fn from_percent(percent: u8) -> Result<Self, ValueError> {
        if percent > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(percent),
            });
        }
        let index = BUCKET_UPPER
            .iter()
            .position(|upper| percent < *upper)
            .unwrap_or(BUCKET_UPPER.len());
        // index is at most 3, so the level is at most 4
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(index as u8 + 1))
    }

    /// Returns the device level (1-4).
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the canonical percentage for this level.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        LEVEL_PERCENT[(self.0 - 1) as usize]
    }
}

impl fmt::Display for FanLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.0)
    }
}

impl TryFrom<u8> for FanLevel {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FanLevel> for u8 {
    fn from(level: FanLevel) -> Self {
        level.0
    }
}

/// Maps a device fan level to its canonical percentage.
#[must_use]
pub fn level_to_percent(level: FanLevel) -> u8 {
    level.percent()
}

/// Maps a percentage (0-100) to a device fan level.
///
/// # Errors
///
/// Returns `ValueError::OutOfRange` for negative values or values above 100.
pub fn percent_to_level(percent: i64) -> Result<FanLevel, ValueError> {
    let narrowed = u8::try_from(percent).map_err(|_| ValueError::OutOfRange {
        min: 0,
        max: 100,
        actual: percent,
    })?;
    FanLevel::from_percent(narrowed)
}
