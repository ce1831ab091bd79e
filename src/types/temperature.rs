// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature conversions and the [`Celsius`] value type.
//!
//! The device reports and accepts whole degrees Fahrenheit. The canonical
//! model works in Celsius with one decimal. Every rounding step in this crate
//! goes through [`round_half_up`] so readings and setpoints never disagree on
//! the rule used.

use std::fmt;

use crate::error::ValueError;

/// Lowest Fahrenheit value the device can meaningfully report.
pub const MIN_FAHRENHEIT: f64 = -40.0;

/// Highest Fahrenheit value the device can meaningfully report.
pub const MAX_FAHRENHEIT: f64 = 140.0;

/// Rounds to the nearest integer, ties toward positive infinity.
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to one decimal place, ties toward positive infinity.
#[must_use]
pub fn round_tenths(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Converts Fahrenheit to Celsius without rounding.
///
/// # Examples
///
/// ```
/// use dreo_climate::types::fahrenheit_to_celsius;
///
/// assert!((fahrenheit_to_celsius(68.0) - 20.0).abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Converts Celsius to whole degrees Fahrenheit.
///
/// The device only accepts integer degrees, so the result is rounded
/// half-up.
///
/// # Examples
///
/// ```
/// use dreo_climate::types::celsius_to_fahrenheit;
///
/// assert_eq!(celsius_to_fahrenheit(21.5), 71);
/// assert_eq!(celsius_to_fahrenheit(20.0), 68);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn celsius_to_fahrenheit(celsius: f64) -> i64 {
    round_half_up(celsius * 9.0 / 5.0 + 32.0) as i64
}

/// A temperature in degrees Celsius with one decimal of precision.
///
/// # Examples
///
/// ```
/// use dreo_climate::types::Celsius;
///
/// let t = Celsius::from_fahrenheit(75.0);
/// assert!((t.value() - 23.9).abs() < 1e-9);
///
/// let setpoint = Celsius::new(21.46).unwrap();
/// assert!((setpoint.value() - 21.5).abs() < 1e-9);
/// assert_eq!(setpoint.to_fahrenheit(), 71);
///
/// assert!(Celsius::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64")]
pub struct Celsius(f64);

impl Celsius {
    /// Lowest accepted value, matching [`MIN_FAHRENHEIT`].
    pub const MIN: f64 = -40.0;

    /// Highest accepted value, matching [`MAX_FAHRENHEIT`].
    pub const MAX: f64 = 60.0;

    /// Creates a temperature, rounding to one decimal.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` for NaN or infinity and
    /// `ValueError::OutOfRange` outside [`Self::MIN`]..=[`Self::MAX`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if !value.is_finite() {
            return Err(ValueError::NotFinite);
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN as i64,
                max: Self::MAX as i64,
                actual: value.round() as i64,
            });
        }
        Ok(Self(round_tenths(value)))
    }

    /// Converts a Fahrenheit reading, rounding to one decimal.
    #[must_use]
    pub fn from_fahrenheit(fahrenheit: f64) -> Self {
        Self(round_tenths(fahrenheit_to_celsius(fahrenheit)))
    }

    /// Returns the value in degrees Celsius.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Returns the value in whole degrees Fahrenheit, as the device expects.
    #[must_use]
    pub fn to_fahrenheit(&self) -> i64 {
        celsius_to_fahrenheit(self.0)
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

impl TryFrom<f64> for Celsius {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fahrenheit_round_trip_within_one_degree() {
        for f in -40..=140_i64 {
            #[allow(clippy::cast_precision_loss)]
            let c = fahrenheit_to_celsius(f as f64);
            let back = celsius_to_fahrenheit(c);
            assert!((back - f).abs() <= 1, "{f}F -> {c}C -> {back}F");
        }
    }

    #[test]
    fn rounded_celsius_round_trip_within_one_degree() {
        for f in -40..=140_i64 {
            #[allow(clippy::cast_precision_loss)]
            let back = Celsius::from_fahrenheit(f as f64).to_fahrenheit();
            assert!((back - f).abs() <= 1);
        }
    }

    #[test]
    fn known_conversions() {
        assert!(close(Celsius::from_fahrenheit(75.0).value(), 23.9));
        assert!(close(Celsius::from_fahrenheit(68.0).value(), 20.0));
        assert!(close(Celsius::from_fahrenheit(32.0).value(), 0.0));
        assert!(close(Celsius::from_fahrenheit(-40.0).value(), -40.0));
        assert_eq!(celsius_to_fahrenheit(21.5), 71);
        assert_eq!(celsius_to_fahrenheit(0.0), 32);
    }

    #[test]
    fn rounding_is_half_up() {
        assert!(close(round_half_up(2.5), 3.0));
        assert!(close(round_half_up(-2.5), -2.0));
        assert!(close(round_tenths(21.25), 21.3));
        assert!(close(round_tenths(21.24), 21.2));
    }

    #[test]
    fn celsius_rejects_non_finite() {
        assert_eq!(Celsius::new(f64::NAN), Err(ValueError::NotFinite));
        assert_eq!(Celsius::new(f64::INFINITY), Err(ValueError::NotFinite));
    }

    #[test]
    fn celsius_rejects_out_of_range() {
        assert!(matches!(
            Celsius::new(75.0),
            Err(ValueError::OutOfRange { actual: 75, .. })
        ));
        assert!(Celsius::new(-41.0).is_err());
        assert!(Celsius::new(60.0).is_ok());
    }

    #[test]
    fn deserialization_validates() {
        let parsed: Celsius = serde_json::from_str("21.46").unwrap();
        assert!(close(parsed.value(), 21.5));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "21.5");

        assert!(serde_json::from_str::<Celsius>("75.0").is_err());
        assert!(serde_json::from_str::<Celsius>("-41").is_err());
    }

    #[test]
    fn celsius_display() {
        assert_eq!(Celsius::new(21.5).unwrap().to_string(), "21.5\u{00b0}C");
    }
}
