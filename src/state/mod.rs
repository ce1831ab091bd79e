// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical device state types.
//!
//! [`CanonicalDeviceState`] is the unit-correct, immutable view of a device.
//! [`Field`] and [`FieldValue`] address individual fields dynamically, and
//! [`StateChange`] describes what differs between two states.
//!
//! # Examples
//!
//! ```
//! use dreo_climate::state::{Field, FieldValue};
//!
//! let field: Field = "powerOn".parse().unwrap();
//! let value = FieldValue::from(true);
//! assert_eq!(field, Field::Power);
//! assert_eq!(value.as_bool(), Some(true));
//! ```

mod device_state;
mod field;
mod state_change;

pub use device_state::{CanonicalDeviceState, DeviceSnapshot};
pub use field::{Field, FieldValue};
pub use state_change::StateChange;
