// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write intents and their dispatch.
//!
//! | Field | Intent | Vendor property | Payload |
//! |-------|--------|-----------------|---------|
//! | `powerOn` | [`Intent::Power`] | `poweron` | `{"state": bool}` |
//! | `targetTemperatureC` | [`Intent::TargetTemperature`] | `templevel` | `{"state": °F}` |
//! | `hvacMode` | [`Intent::Mode`] | `mode` | `{"state": code}` |
//! | `fanSpeedPercent` | [`Intent::FanSpeed`] | `windlevel` | `{"state": 1-4}` |
//! | `swingEnabled` | [`Intent::Swing`] | `oscmode` | `{"state": bool}` |
//!
//! `currentTemperatureC` is read-only.

mod dispatcher;
mod intent;

pub use dispatcher::CommandDispatcher;
pub use intent::{Ack, Intent, PendingIntent};
