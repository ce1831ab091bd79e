// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types and unit conversions for the canonical climate model.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so a canonical state never holds an out-of-domain value.
//!
//! # Types
//!
//! - [`Celsius`] - Temperature with one decimal of precision
//! - [`FanLevel`] - Discrete device fan level (1-4) and its percentage bucket
//! - [`HvacMode`] - Canonical operating mode
//! - [`HvacActivity`] - Derived current activity (inactive/idle/cooling/...)

mod fan_level;
mod hvac_mode;
mod temperature;

pub use fan_level::{FanLevel, level_to_percent, percent_to_level};
pub use hvac_mode::{HvacActivity, HvacMode};
pub use temperature::{
    Celsius, MAX_FAHRENHEIT, MIN_FAHRENHEIT, celsius_to_fahrenheit, fahrenheit_to_celsius,
    round_half_up, round_tenths,
};
