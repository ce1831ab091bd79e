// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical state cache.
//!
//! [`StateCache`] holds the most recent canonical state of each registered
//! device and coordinates fetches: single-flight per device, results applied
//! by sequence number, explicit invalidation.

mod state_cache;

pub(crate) use state_cache::millis;
pub use state_cache::StateCache;
