// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device facade composing cache, poller and dispatcher.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::cache::StateCache;
use crate::clock::{Clock, SystemClock};
use crate::command::{Ack, CommandDispatcher, Intent};
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::poller::Poller;
use crate::state::{CanonicalDeviceState, DeviceSnapshot, Field, FieldValue, StateChange};
use crate::subscription::{CallbackRegistry, SubscriptionId};
use crate::transport::DeviceTransport;

use super::ClimateConfig;

/// Single entry point for reading and writing climate devices.
///
/// Registering a device creates its cache entry and starts its poller.
/// Reads are served from the cache, even when stale; only a device that was
/// never fetched triggers a one-time bootstrap refresh. Writes go through the
/// [`CommandDispatcher`].
///
/// # Examples
///
/// ```no_run
/// use dreo_climate::{ClimateConfig, ClimateManager, DeviceId};
/// use dreo_climate::state::{Field, FieldValue};
/// use dreo_climate::transport::HttpConfig;
///
/// #[tokio::main]
/// async fn main() -> dreo_climate::Result<()> {
///     let transport = HttpConfig::new("https://app-api-us.dreo-cloud.com", "token")
///         .into_transport()?;
///     let manager = ClimateManager::new(transport, ClimateConfig::default());
///
///     let device_id = DeviceId::new("HAC-0042");
///     manager.register(device_id.clone());
///
///     let current = manager.read(&device_id, Field::CurrentTemperature).await?;
///     println!("Room temperature: {current}");
///
///     manager
///         .write(&device_id, Field::TargetTemperature, FieldValue::Number(21.5))
///         .await?;
///     Ok(())
/// }
/// ```
pub struct ClimateManager<T> {
    config: ClimateConfig,
    cache: StateCache<T>,
    dispatcher: CommandDispatcher<T>,
    poller: Poller<T>,
    events: EventBus,
    callbacks: Arc<CallbackRegistry>,
}

impl<T: DeviceTransport> ClimateManager<T> {
    /// Creates a manager using the system clock.
    #[must_use]
    pub fn new(transport: T, config: ClimateConfig) -> Self {
        Self::with_clock(transport, config, Arc::new(SystemClock))
    }

    /// Creates a manager stamping refreshes with `clock`.
    #[must_use]
    pub fn with_clock(transport: T, config: ClimateConfig, clock: Arc<dyn Clock>) -> Self {
        let events = EventBus::with_capacity(config.event_capacity());
        let callbacks = Arc::new(CallbackRegistry::new());
        let cache = StateCache::new(
            transport,
            clock,
            events.clone(),
            Arc::clone(&callbacks),
            config.request_timeout(),
            config.staleness_threshold(),
        );

        Self {
            dispatcher: CommandDispatcher::new(cache.clone()),
            poller: Poller::new(cache.clone(), config.poll_interval()),
            cache,
            config,
            events,
            callbacks,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClimateConfig {
        &self.config
    }

    // =========================================================================
    // Device lifecycle
    // =========================================================================

    /// Registers a device and starts polling it.
    ///
    /// Returns `false` if the device was already registered. Must be called
    /// within a tokio runtime.
    pub fn register(&self, device_id: DeviceId) -> bool {
        if !self.cache.register(&device_id) {
            return false;
        }
        self.poller.start(&device_id);
        info!(%device_id, "Registered device");
        self.events.publish(DeviceEvent::device_added(device_id));
        true
    }

    /// Removes a device: stops its poller and drops its cache entry and
    /// callbacks. A fetch in flight completes and is discarded.
    ///
    /// Returns `false` if the device was not registered.
    pub fn remove(&self, device_id: &DeviceId) -> bool {
        self.poller.stop(device_id);
        if !self.cache.remove(device_id) {
            return false;
        }
        self.callbacks.clear_device(device_id);
        info!(%device_id, "Removed device");
        self.events
            .publish(DeviceEvent::device_removed(device_id.clone()));
        true
    }

    /// Returns the registered devices.
    #[must_use]
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.cache.device_ids()
    }

    /// Returns `true` if the device is being polled.
    #[must_use]
    pub fn is_polling(&self, device_id: &DeviceId) -> bool {
        self.poller.is_polling(device_id)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the cached state without touching the network.
    ///
    /// `None` if the device was never fetched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered.
    pub fn cached_state(&self, device_id: &DeviceId) -> Result<Option<DeviceSnapshot>> {
        self.cache.get(device_id)
    }

    /// Returns the canonical state, fetching once if nothing is cached yet.
    ///
    /// # Errors
    ///
    /// Fails only if the device is unknown or the bootstrap fetch fails.
    pub async fn state(&self, device_id: &DeviceId) -> Result<DeviceSnapshot> {
        if let Some(snapshot) = self.cache.get(device_id)? {
            return Ok(snapshot);
        }

        debug!(%device_id, "No cached state, bootstrapping");
        let state = self.cache.refresh(device_id).await?;
        Ok(DeviceSnapshot {
            state,
            is_stale: false,
        })
    }

    /// Reads one field.
    ///
    /// # Errors
    ///
    /// Same as [`state`](Self::state), plus
    /// [`Error::CapabilityNotSupported`] when reading swing from a device
    /// that does not report it.
    pub async fn read(&self, device_id: &DeviceId, field: Field) -> Result<FieldValue> {
        let snapshot = self.state(device_id).await?;
        snapshot
            .state
            .field(field)
            .ok_or(Error::CapabilityNotSupported(field))
    }

    /// Forces a fetch, joining one already in flight unless invalidated.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; the cached state is kept.
    pub async fn refresh(&self, device_id: &DeviceId) -> Result<Arc<CanonicalDeviceState>> {
        self.cache.refresh(device_id).await
    }

    /// Makes the next refresh issue a new fetch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered.
    pub fn invalidate(&self, device_id: &DeviceId) -> Result<()> {
        self.cache.invalidate(device_id)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Writes one field.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::apply_intent`].
    pub async fn write(&self, device_id: &DeviceId, field: Field, value: FieldValue) -> Result<Ack> {
        self.dispatcher.apply_intent(device_id, field, value).await
    }

    /// Dispatches an already validated intent.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::dispatch`].
    pub async fn apply_intent(&self, device_id: &DeviceId, intent: Intent) -> Result<Ack> {
        self.dispatcher.dispatch(device_id, intent).await
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Subscribes to events for every device.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    /// Registers a callback fired when the state of `device_id` changes.
    ///
    /// The callback runs on the task that applied the change and should not
    /// block.
    pub fn on_state_changed<F>(&self, device_id: &DeviceId, callback: F) -> SubscriptionId
    where
        F: Fn(&[StateChange], &CanonicalDeviceState) + Send + Sync + 'static,
    {
        self.callbacks.on_state_changed(device_id, callback)
    }

    /// Unregisters a callback. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}

impl<T> std::fmt::Debug for ClimateManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClimateManager")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::transport::InMemoryTransport;
    use crate::translate::RawDeviceState;
    use crate::types::HvacMode;

    fn raw() -> RawDeviceState {
        RawDeviceState::new()
            .with("poweron", true)
            .with("mode", 1)
            .with("temperature", 75)
            .with("templevel", 68)
            .with("windlevel", 3)
    }

    fn manager() -> (Arc<InMemoryTransport>, ClimateManager<Arc<InMemoryTransport>>, DeviceId) {
        let transport = Arc::new(InMemoryTransport::new());
        let id = DeviceId::new("AC-1");
        transport.set_state(&id, raw());
        let manager = ClimateManager::with_clock(
            Arc::clone(&transport),
            ClimateConfig::default(),
            Arc::new(ManualClock::new()),
        );
        (transport, manager, id)
    }

    #[tokio::test(start_paused = true)]
    async fn register_publishes_and_polls() {
        let (_, manager, id) = manager();
        let mut events = manager.subscribe();

        assert!(manager.register(id.clone()));
        assert!(!manager.register(id.clone()));
        assert!(manager.is_polling(&id));
        assert_eq!(manager.device_ids(), vec![id.clone()]);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, DeviceEvent::DeviceAdded { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn remove_stops_everything() {
        let (_, manager, id) = manager();
        manager.register(id.clone());
        manager.on_state_changed(&id, |_, _| {});

        assert!(manager.remove(&id));
        assert!(!manager.remove(&id));
        assert!(!manager.is_polling(&id));
        assert!(matches!(
            manager.cached_state(&id),
            Err(Error::DeviceNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn read_bootstraps_once() {
        let (transport, manager, id) = manager();
        manager.register(id.clone());

        let mode = manager.read(&id, Field::Mode).await.unwrap();
        assert_eq!(mode, FieldValue::Mode(HvacMode::Cool));
        manager.read(&id, Field::Power).await.unwrap();

        assert_eq!(transport.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unreported_swing_is_unsupported() {
        let (_, manager, id) = manager();
        manager.register(id.clone());

        assert_eq!(
            manager.read(&id, Field::Swing).await,
            Err(Error::CapabilityNotSupported(Field::Swing))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_failure_surfaces_on_read() {
        let transport = Arc::new(InMemoryTransport::new());
        let id = DeviceId::new("AC-1");
        let manager = ClimateManager::new(Arc::clone(&transport), ClimateConfig::default());
        manager.register(id.clone());

        let err = manager.read(&id, Field::Power).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_reads_still_succeed() {
        let transport = Arc::new(InMemoryTransport::new());
        let clock = Arc::new(ManualClock::new());
        let id = DeviceId::new("AC-1");
        transport.set_state(&id, raw());
        let manager = ClimateManager::with_clock(
            Arc::clone(&transport),
            ClimateConfig::default(),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        manager.register(id.clone());
        manager.state(&id).await.unwrap();

        transport.set_fetch_delay(Duration::from_secs(3600));
        clock.advance(Duration::from_secs(120));

        let snapshot = manager.state(&id).await.unwrap();
        assert!(snapshot.is_stale);
    }
}
