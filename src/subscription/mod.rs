// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback subscriptions for device state changes.
//!
//! Callbacks fire when a refresh or an optimistic update produces a state
//! that differs from the previous one. They receive the field-by-field
//! changes and the complete new state.
//!
//! # Usage
//!
//! ```no_run
//! use dreo_climate::{ClimateConfig, ClimateManager, DeviceId};
//! use dreo_climate::transport::InMemoryTransport;
//!
//! # async fn example() -> dreo_climate::Result<()> {
//! let manager = ClimateManager::new(InMemoryTransport::new(), ClimateConfig::default());
//! let device_id = DeviceId::new("AC-1");
//! manager.register(device_id.clone());
//!
//! let sub_id = manager.on_state_changed(&device_id, |changes, state| {
//!     println!("{} fields changed, now {:?}", changes.len(), state.activity());
//! });
//!
//! manager.unsubscribe(sub_id);
//! # Ok(())
//! # }
//! ```
//!
//! For a stream of every event across devices use
//! [`ClimateManager::subscribe`](crate::ClimateManager::subscribe).

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
