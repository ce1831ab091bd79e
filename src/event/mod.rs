// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for device registration and state changes.
//!
//! The [`EventBus`] uses tokio's broadcast channel so any number of
//! subscribers can observe [`DeviceEvent`]s. For per-device callbacks see
//! [`crate::subscription`].
//!
//! # Examples
//!
//! ```
//! use dreo_climate::event::{DeviceEvent, DeviceId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::device_added(DeviceId::new("AC-1")));
//! ```

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
