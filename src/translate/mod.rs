// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation between the vendor's raw property map and the canonical model.
//!
//! - [`RawDeviceState`] holds the untyped `{property: {"state": value}}` map
//! - [`translate`] validates it into a [`CanonicalDeviceState`](crate::state::CanonicalDeviceState)
//! - [`RawCommand`] builds the `(property, {"state": value})` command payloads

mod raw_state;
mod translator;

pub use raw_state::{RawDeviceState, property};
pub use translator::{
    RawCommand, Translation, TranslationMiss, canonical_mode_to_raw, raw_mode_to_canonical,
    translate,
};
