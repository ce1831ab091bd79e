// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field-by-field differences between two canonical states.

use serde::Serialize;

use super::{CanonicalDeviceState, Field, FieldValue};

/// A single field that differs between two states.
///
/// `previous` is `None` when there was no earlier state, or when the
/// earlier state did not report the (optional) field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    /// The field that changed.
    pub field: Field,
    /// Value before the change.
    pub previous: Option<FieldValue>,
    /// Value after the change.
    pub current: Option<FieldValue>,
}

impl StateChange {
    /// Computes the changes from `previous` to `next`.
    ///
    /// Without a previous state, every field `next` reports is a change.
    /// The refresh timestamp is not a field and never produces a change.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use dreo_climate::command::Intent;
    /// use dreo_climate::state::{CanonicalDeviceState, Field, StateChange};
    /// use dreo_climate::types::{Celsius, HvacMode};
    ///
    /// let before = CanonicalDeviceState::new(
    ///     true,
    ///     Celsius::from_fahrenheit(75.0),
    ///     Celsius::from_fahrenheit(68.0),
    ///     HvacMode::Cool,
    ///     60,
    ///     None,
    ///     Utc::now(),
    /// );
    /// let after = before.with_intent(&Intent::Mode(HvacMode::Dry));
    ///
    /// let changes = StateChange::diff(Some(&before), &after);
    /// assert_eq!(changes.len(), 1);
    /// assert_eq!(changes[0].field, Field::Mode);
    /// ```
    #[must_use]
    pub fn diff(previous: Option<&CanonicalDeviceState>, next: &CanonicalDeviceState) -> Vec<Self> {
        Field::ALL
            .into_iter()
            .filter_map(|field| {
                let before = previous.and_then(|p| p.field(field));
                let after = next.field(field);
                let changed = match previous {
                    Some(_) => before != after,
                    None => after.is_some(),
                };
                changed.then_some(Self {
                    field,
                    previous: before,
                    current: after,
                })
            })
            .collect()
    }
}
