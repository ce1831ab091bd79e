// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Climate manager facade.
//!
//! The [`ClimateManager`] is the entry point for host integrations. It
//! composes the state cache, the per-device poller and the command
//! dispatcher behind a flat API:
//!
//! - **Lifecycle**: `register`, `remove`, `device_ids`
//! - **Reads**: `state`, `read`, `cached_state`, `refresh`
//! - **Writes**: `write`, `apply_intent`
//! - **Notifications**: `subscribe` (all events), `on_state_changed` (per device)
//!
//! # Event Subscription
//!
//! ```no_run
//! use dreo_climate::{ClimateConfig, ClimateManager};
//! use dreo_climate::event::DeviceEvent;
//! use dreo_climate::transport::InMemoryTransport;
//!
//! # async fn example() {
//! let manager = ClimateManager::new(InMemoryTransport::new(), ClimateConfig::default());
//! let mut events = manager.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             DeviceEvent::StateChanged { device_id, changes, .. } => {
//!                 println!("{device_id}: {} field(s) changed", changes.len());
//!             }
//!             DeviceEvent::TranslationMiss { device_id, miss } => {
//!                 println!("{device_id}: untranslated {} = {}", miss.property, miss.raw);
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//! # }
//! ```

mod climate_manager;
mod config;

pub use climate_manager::ClimateManager;
pub use config::ClimateConfig;
