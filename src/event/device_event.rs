// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use std::sync::Arc;

use crate::state::{CanonicalDeviceState, StateChange};
use crate::translate::TranslationMiss;

use super::DeviceId;

/// Events emitted by the climate manager.
///
/// These events notify subscribers about device registration, canonical state
/// changes, and translation problems. All events carry the device ID.
///
/// # Examples
///
/// ```
/// use dreo_climate::event::{DeviceEvent, DeviceId};
///
/// let device_id = DeviceId::new("AC-1");
/// let added = DeviceEvent::device_added(device_id.clone());
/// assert!(added.is_lifecycle());
/// assert_eq!(added.device_id(), &device_id);
/// ```
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A device was registered.
    DeviceAdded {
        /// The registered device.
        device_id: DeviceId,
    },

    /// A device was removed.
    DeviceRemoved {
        /// The removed device.
        device_id: DeviceId,
    },

    /// The canonical state changed after a refresh or an optimistic update.
    StateChanged {
        /// The device whose state changed.
        device_id: DeviceId,
        /// Field-by-field differences from the previous state.
        changes: Vec<StateChange>,
        /// The complete new state.
        new_state: Arc<CanonicalDeviceState>,
    },

    /// A raw value had no declared translation and a fallback was used.
    TranslationMiss {
        /// The device that reported the value.
        device_id: DeviceId,
        /// What was missed.
        miss: TranslationMiss,
    },

    /// A refresh failed; the cached state was left in place.
    RefreshFailed {
        /// The device whose refresh failed.
        device_id: DeviceId,
        /// Description of the failure.
        error: String,
    },
}

impl DeviceEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::StateChanged { device_id, .. }
            | Self::TranslationMiss { device_id, .. }
            | Self::RefreshFailed { device_id, .. } => device_id,
        }
    }

    /// Returns `true` if this is a device lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: DeviceId) -> Self {
        Self::DeviceAdded { device_id }
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(device_id: DeviceId) -> Self {
        Self::DeviceRemoved { device_id }
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(
        device_id: DeviceId,
        changes: Vec<StateChange>,
        new_state: Arc<CanonicalDeviceState>,
    ) -> Self {
        Self::StateChanged {
            device_id,
            changes,
            new_state,
        }
    }

    /// Creates a translation miss event.
    #[must_use]
    pub fn translation_miss(device_id: DeviceId, miss: TranslationMiss) -> Self {
        Self::TranslationMiss { device_id, miss }
    }

    /// Creates a refresh failure event.
    #[must_use]
    pub fn refresh_failed(device_id: DeviceId, error: impl ToString) -> Self {
        Self::RefreshFailed {
            device_id,
            error: error.to_string(),
        }
    }
}
