// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device state subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Per-device registry storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::event::DeviceId;
use crate::state::{CanonicalDeviceState, StateChange};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to unsubscribe later. IDs
/// are unique for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback receiving the field changes and the complete new state.
type StateChangedCallback = Arc<dyn Fn(&[StateChange], &CanonicalDeviceState) + Send + Sync>;

/// Registry of per-device state change callbacks.
///
/// Uses `parking_lot::RwLock` for interior mutability. Callbacks are invoked
/// after the lock is released, so a callback may itself subscribe or
/// unsubscribe.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use dreo_climate::event::DeviceId;
/// use dreo_climate::subscription::CallbackRegistry;
///
/// let registry = CallbackRegistry::new();
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
///
/// let id = registry.on_state_changed(&DeviceId::new("AC-1"), move |changes, _state| {
///     counter.fetch_add(changes.len(), Ordering::SeqCst);
/// });
///
/// assert!(registry.unsubscribe(id));
/// assert!(!registry.unsubscribe(id));
/// ```
pub struct CallbackRegistry {
    next_id: AtomicU64,
    callbacks: RwLock<HashMap<DeviceId, HashMap<SubscriptionId, StateChangedCallback>>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback fired whenever the state of `device_id` changes.
    pub fn on_state_changed<F>(&self, device_id: &DeviceId, callback: F) -> SubscriptionId
    where
        F: Fn(&[StateChange], &CanonicalDeviceState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.callbacks
            .write()
            .entry(device_id.clone())
            .or_default()
            .insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.write();
        let Some(device_id) = callbacks
            .iter()
            .find_map(|(device_id, subs)| subs.contains_key(&id).then(|| device_id.clone()))
        else {
            return false;
        };

        if let Some(subs) = callbacks.get_mut(&device_id) {
            subs.remove(&id);
            if subs.is_empty() {
                callbacks.remove(&device_id);
            }
        }
        true
    }

    /// Drops every callback registered for `device_id`.
    pub fn clear_device(&self, device_id: &DeviceId) {
        self.callbacks.write().remove(device_id);
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.callbacks.write().clear();
    }

    /// Returns the number of callbacks registered for `device_id`.
    #[must_use]
    pub fn count(&self, device_id: &DeviceId) -> usize {
        self.callbacks.read().get(device_id).map_or(0, HashMap::len)
    }

    /// Invokes every callback registered for `device_id`.
    ///
    /// Callbacks are called synchronously in an arbitrary order.
    pub fn dispatch(
        &self,
        device_id: &DeviceId,
        changes: &[StateChange],
        state: &CanonicalDeviceState,
    ) {
        let targets: Vec<StateChangedCallback> = self
            .callbacks
            .read()
            .get(device_id)
            .map(|subs| subs.values().cloned().collect())
            .unwrap_or_default();

        for callback in targets {
            callback(changes, state);
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let callbacks = self.callbacks.read();
        f.debug_struct("CallbackRegistry")
            .field("devices", &callbacks.len())
            .field(
                "callbacks",
                &callbacks.values().map(HashMap::len).sum::<usize>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use chrono::Utc;

    use super::*;
    use crate::types::{Celsius, HvacMode};

    fn state() -> CanonicalDeviceState {
        CanonicalDeviceState::new(
            true,
            Celsius::from_fahrenheit(75.0),
            Celsius::from_fahrenheit(68.0),
            HvacMode::Cool,
            60,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn subscription_ids_are_unique() {
        let registry = CallbackRegistry::new();
        let device = DeviceId::new("AC-1");
        let a = registry.on_state_changed(&device, |_, _| {});
        let b = registry.on_state_changed(&device, |_, _| {});
        assert_ne!(a, b);
        assert_eq!(registry.count(&device), 2);
    }

    #[test]
    fn dispatch_reaches_only_matching_device() {
        let registry = CallbackRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        registry.on_state_changed(&DeviceId::new("AC-1"), move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&hits);
        registry.on_state_changed(&DeviceId::new("AC-2"), move |_, _| {
            counter.fetch_add(100, Ordering::SeqCst);
        });

        let changes = StateChange::diff(None, &state());
        registry.dispatch(&DeviceId::new("AC-1"), &changes, &state());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribed_callback_is_not_called() {
        let registry = CallbackRegistry::new();
        let device = DeviceId::new("AC-1");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = registry.on_state_changed(&device, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(registry.unsubscribe(id));
        registry.dispatch(&device, &[], &state());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(registry.count(&device), 0);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let device = DeviceId::new("AC-1");
        let slot = Arc::new(parking_lot::Mutex::new(None));

        let inner_registry = Arc::clone(&registry);
        let inner_slot = Arc::clone(&slot);
        let id = registry.on_state_changed(&device, move |_, _| {
            if let Some(id) = inner_slot.lock().take() {
                inner_registry.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        registry.dispatch(&device, &[], &state());
        assert_eq!(registry.count(&device), 0);
    }

    #[test]
    fn clear_device() {
        let registry = CallbackRegistry::new();
        let device = DeviceId::new("AC-1");
        registry.on_state_changed(&device, |_, _| {});
        registry.clear_device(&device);
        assert_eq!(registry.count(&device), 0);
    }
}
