// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dreo Climate - translation and synchronization core for cloud-controlled
//! air conditioners.
//!
//! The vendor cloud reports device state as an untyped property map
//! (`poweron`, `mode`, `temperature`, `templevel`, `windlevel`, `oscmode`)
//! with Fahrenheit temperatures and small integer codes. This library turns
//! it into a fixed, unit-correct canonical model and keeps that model in sync:
//!
//! - **Translation**: raw properties to [`CanonicalDeviceState`] and back to
//!   `{"state": value}` command payloads, with explicit errors instead of
//!   guessed fallbacks
//! - **Cache**: per-device single-flight refresh, out-of-order results
//!   discarded by sequence number
//! - **Poller**: fixed-period background refresh per device
//! - **Writes**: validated intents, optimistic update on acknowledgement,
//!   confirmatory re-fetch
//! - **Notifications**: broadcast events and per-device callbacks on change
//!
//! # Quick Start
//!
//! ```no_run
//! use dreo_climate::{ClimateConfig, ClimateManager, DeviceId};
//! use dreo_climate::state::{Field, FieldValue};
//! use dreo_climate::transport::HttpConfig;
//! use dreo_climate::types::HvacMode;
//!
//! #[tokio::main]
//! async fn main() -> dreo_climate::Result<()> {
//!     let transport = HttpConfig::new("https://app-api-us.dreo-cloud.com", "token")
//!         .into_transport()?;
//!     let manager = ClimateManager::new(transport, ClimateConfig::default());
//!
//!     let device_id = DeviceId::new("HAC-0042");
//!     manager.register(device_id.clone());
//!
//!     manager.on_state_changed(&device_id, |changes, state| {
//!         for change in changes {
//!             println!("{} -> {:?}", change.field, change.current);
//!         }
//!         println!("activity: {:?}", state.activity());
//!     });
//!
//!     manager
//!         .write(&device_id, Field::Mode, FieldValue::Mode(HvacMode::Cool))
//!         .await?;
//!     manager
//!         .write(&device_id, Field::TargetTemperature, FieldValue::Number(21.5))
//!         .await?;
//!
//!     let target = manager.read(&device_id, Field::TargetTemperature).await?;
//!     println!("target: {target}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod manager;
pub mod poller;
pub mod state;
pub mod subscription;
pub mod translate;
pub mod transport;
pub mod types;

pub use cache::StateCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{Ack, CommandDispatcher, Intent, PendingIntent};
pub use error::{
    CommandFailedError, Error, MalformedReason, MalformedStateError, Result, TransportError,
    ValueError,
};
pub use event::{DeviceEvent, DeviceId, EventBus};
pub use manager::{ClimateConfig, ClimateManager};
pub use poller::Poller;
pub use state::{CanonicalDeviceState, DeviceSnapshot, Field, FieldValue, StateChange};
pub use subscription::{CallbackRegistry, SubscriptionId};
pub use translate::{RawDeviceState, TranslationMiss};
#[cfg(feature = "http")]
pub use transport::{HttpConfig, HttpTransport};
pub use transport::{DeviceTransport, InMemoryTransport};
pub use types::{Celsius, FanLevel, HvacActivity, HvacMode};
