// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device canonical state cache with single-flight refresh.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::clock::Clock;
use crate::command::Intent;
use crate::error::{Error, Result, TransportError};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::state::{CanonicalDeviceState, DeviceSnapshot, StateChange};
use crate::subscription::CallbackRegistry;
use crate::translate::{Translation, TranslationMiss, translate};
use crate::transport::DeviceTransport;

type FetchOutcome = Option<std::result::Result<Arc<CanonicalDeviceState>, Error>>;

/// A fetch that has been issued and not yet applied.
struct InFlight {
    seq: u64,
    rx: watch::Receiver<FetchOutcome>,
}

impl InFlight {
    /// `false` once the fetch task is gone without reporting.
    fn is_live(&self) -> bool {
        self.rx.has_changed().is_ok()
    }
}

#[derive(Default)]
struct Entry {
    state: Option<Arc<CanonicalDeviceState>>,
    /// Sequence number of the fetch or write that produced `state`.
    applied_seq: u64,
    needs_refetch: bool,
    in_flight: Option<InFlight>,
}

impl Entry {
    fn live_fetch(&self) -> Option<&InFlight> {
        self.in_flight.as_ref().filter(|f| f.is_live())
    }
}

struct Inner<T> {
    transport: T,
    clock: Arc<dyn Clock>,
    events: EventBus,
    callbacks: Arc<CallbackRegistry>,
    request_timeout: Duration,
    staleness_threshold: Duration,
    next_seq: AtomicU64,
    entries: RwLock<HashMap<DeviceId, Entry>>,
}

/// Most recently fetched canonical state per device.
///
/// Reads never touch the network. Refreshes are single-flight per device:
/// concurrent callers share one remote fetch. Every fetch and optimistic
/// write takes a number from one monotonic sequence, and a fetch result with
/// a lower number than the one the entry currently holds is discarded, so a
/// slow early fetch can never overwrite a newer state.
///
/// Clones share the same entries.
pub struct StateCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for StateCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for StateCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCache")
            .field("devices", &self.inner.entries.read().len())
            .field("request_timeout", &self.inner.request_timeout)
            .field("staleness_threshold", &self.inner.staleness_threshold)
            .finish_non_exhaustive()
    }
}

impl<T: DeviceTransport> StateCache<T> {
    /// Creates an empty cache.
    ///
    /// Every fetch is bounded by `request_timeout`. State changes are
    /// published on `events` and dispatched to `callbacks`.
    #[must_use]
    pub fn new(
        transport: T,
        clock: Arc<dyn Clock>,
        events: EventBus,
        callbacks: Arc<CallbackRegistry>,
        request_timeout: Duration,
        staleness_threshold: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                clock,
                events,
                callbacks,
                request_timeout,
                staleness_threshold,
                next_seq: AtomicU64::new(0),
                entries: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Adds an empty entry. Returns `false` if the device was already present.
    pub fn register(&self, device_id: &DeviceId) -> bool {
        let mut entries = self.inner.entries.write();
        if entries.contains_key(device_id) {
            return false;
        }
        entries.insert(device_id.clone(), Entry::default());
        true
    }

    /// Drops the entry. A fetch still in flight completes and is discarded.
    ///
    /// Returns `false` if the device was not present.
    pub fn remove(&self, device_id: &DeviceId) -> bool {
        self.inner.entries.write().remove(device_id).is_some()
    }

    /// Returns `true` if the device has an entry.
    #[must_use]
    pub fn contains(&self, device_id: &DeviceId) -> bool {
        self.inner.entries.read().contains_key(device_id)
    }

    /// Returns the registered devices.
    #[must_use]
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.inner.entries.read().keys().cloned().collect()
    }

    /// Returns the cached state, or `None` if nothing was fetched yet.
    ///
    /// Never blocks on the network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered.
    pub fn get(&self, device_id: &DeviceId) -> Result<Option<DeviceSnapshot>> {
        let entries = self.inner.entries.read();
        let entry = entries
            .get(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.clone()))?;

        Ok(entry.state.as_ref().map(|state| DeviceSnapshot {
            is_stale: state.is_stale(self.inner.clock.now(), self.inner.staleness_threshold),
            state: Arc::clone(state),
        }))
    }

    /// Forces the next refresh to issue a new fetch instead of joining one
    /// already in flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered.
    pub fn invalidate(&self, device_id: &DeviceId) -> Result<()> {
        let mut entries = self.inner.entries.write();
        let entry = entries
            .get_mut(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.clone()))?;
        entry.needs_refetch = true;
        Ok(())
    }

    /// Returns `true` if the device is marked for a confirmatory re-fetch.
    #[must_use]
    pub fn is_invalidated(&self, device_id: &DeviceId) -> bool {
        self.inner
            .entries
            .read()
            .get(device_id)
            .is_some_and(|e| e.needs_refetch)
    }

    /// Fetches and caches the current state.
    ///
    /// Joins a fetch already in flight unless the entry was invalidated since.
    /// On failure the cached entry is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the transport or translation failure of the fetch, or
    /// [`Error::DeviceNotFound`].
    pub async fn refresh(&self, device_id: &DeviceId) -> Result<Arc<CanonicalDeviceState>> {
        let rx = {
            let mut entries = self.inner.entries.write();
            let entry = entries
                .get_mut(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.clone()))?;

            let joinable = entry
                .live_fetch()
                .filter(|_| !entry.needs_refetch)
                .map(|in_flight| (in_flight.seq, in_flight.rx.clone()));

            match joinable {
                Some((seq, rx)) => {
                    trace!(%device_id, seq, "Joining in-flight fetch");
                    rx
                }
                None => self.start_fetch(device_id, entry),
            }
        };

        wait(rx).await
    }

    /// Refreshes unless a fetch is already in flight.
    ///
    /// An entry invalidated since that fetch was issued gets a new one
    /// anyway, since the older result will be discarded. Returns `Ok(None)`
    /// for a skipped tick.
    ///
    /// # Errors
    ///
    /// Same as [`refresh`](Self::refresh).
    pub async fn poll(&self, device_id: &DeviceId) -> Result<Option<Arc<CanonicalDeviceState>>> {
        let rx = {
            let mut entries = self.inner.entries.write();
            let entry = entries
                .get_mut(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.clone()))?;

            if let Some(in_flight) = entry.live_fetch()
                && !entry.needs_refetch
            {
                trace!(%device_id, seq = in_flight.seq, "Fetch in flight, skipping poll tick");
                return Ok(None);
            }
            self.start_fetch(device_id, entry)
        };

        wait(rx).await.map(Some)
    }

    /// Replaces the cached state with `intent` applied and marks the entry
    /// for a confirmatory re-fetch.
    ///
    /// Returns the new state, or `None` if nothing was fetched yet (the entry
    /// is only invalidated).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is not registered.
    pub fn apply_optimistic(
        &self,
        device_id: &DeviceId,
        intent: &Intent,
    ) -> Result<Option<Arc<CanonicalDeviceState>>> {
        let (next, changes) = {
            let mut entries = self.inner.entries.write();
            let entry = entries
                .get_mut(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.clone()))?;

            entry.needs_refetch = true;
            let Some(current) = entry.state.as_deref() else {
                return Ok(None);
            };

            let next = Arc::new(current.with_intent(intent));
            let changes = StateChange::diff(Some(current), &next);
            entry.state = Some(Arc::clone(&next));
            entry.applied_seq = self.inner.next_seq();
            (next, changes)
        };

        debug!(%device_id, field = %intent.field(), "Applied optimistic update");
        self.inner.notify(device_id, &[], changes, &next);
        Ok(Some(next))
    }

    /// Issues a new fetch for `entry`. The caller holds the entries lock.
    fn start_fetch(
        &self,
        device_id: &DeviceId,
        entry: &mut Entry,
    ) -> watch::Receiver<FetchOutcome> {
        let seq = self.inner.next_seq();
        let (tx, rx) = watch::channel(None);

        entry.needs_refetch = false;
        entry.in_flight = Some(InFlight {
            seq,
            rx: rx.clone(),
        });

        let inner = Arc::clone(&self.inner);
        let device_id = device_id.clone();
        tokio::spawn(async move {
            let outcome = inner.fetch(&device_id, seq).await;
            tx.send_replace(Some(outcome));
        });

        rx
    }
}

impl<T: DeviceTransport> Inner<T> {
    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn fetch(
        &self,
        device_id: &DeviceId,
        seq: u64,
    ) -> std::result::Result<Arc<CanonicalDeviceState>, Error> {
        debug!(%device_id, seq, "Fetching device state");

        let fetched = match tokio::time::timeout(
            self.request_timeout,
            self.transport.fetch_state(device_id),
        )
        .await
        {
            Ok(Ok(raw)) => translate(&raw, self.clock.now()).map_err(Error::from),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(TransportError::Timeout(millis(self.request_timeout)).into()),
        };

        self.complete(device_id, seq, fetched)
    }

    fn complete(
        &self,
        device_id: &DeviceId,
        seq: u64,
        fetched: std::result::Result<Translation, Error>,
    ) -> std::result::Result<Arc<CanonicalDeviceState>, Error> {
        let (next, changes, misses) = {
            let mut entries = self.entries.write();
            let Some(entry) = entries.get_mut(device_id) else {
                debug!(%device_id, seq, "Device removed during fetch, discarding result");
                return Err(Error::DeviceNotFound(device_id.clone()));
            };

            if entry.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
                entry.in_flight = None;
            }

            let translation = match fetched {
                Ok(translation) => translation,
                Err(e) => {
                    drop(entries);
                    warn!(%device_id, seq, error = %e, "Refresh failed, keeping cached state");
                    self.events
                        .publish(DeviceEvent::refresh_failed(device_id.clone(), &e));
                    return Err(e);
                }
            };

            if seq < entry.applied_seq {
                warn!(
                    %device_id,
                    seq,
                    applied_seq = entry.applied_seq,
                    "Discarding out-of-order fetch result"
                );
                return entry
                    .state
                    .clone()
                    .ok_or_else(|| Error::DeviceNotFound(device_id.clone()));
            }

            let next = Arc::new(translation.state);
            let changes = StateChange::diff(entry.state.as_deref(), &next);
            entry.state = Some(Arc::clone(&next));
            entry.applied_seq = seq;
            (next, changes, translation.misses)
        };

        self.notify(device_id, &misses, changes, &next);
        Ok(next)
    }

    /// Publishes misses and changes. Called without the entries lock held.
    fn notify(
        &self,
        device_id: &DeviceId,
        misses: &[TranslationMiss],
        changes: Vec<StateChange>,
        state: &Arc<CanonicalDeviceState>,
    ) {
        for miss in misses {
            self.events
                .publish(DeviceEvent::translation_miss(device_id.clone(), miss.clone()));
        }

        if changes.is_empty() {
            return;
        }

        self.callbacks.dispatch(device_id, &changes, state);
        self.events.publish(DeviceEvent::state_changed(
            device_id.clone(),
            changes,
            Arc::clone(state),
        ));
    }
}

async fn wait(mut rx: watch::Receiver<FetchOutcome>) -> Result<Arc<CanonicalDeviceState>> {
    let outcome = rx
        .wait_for(Option::is_some)
        .await
        .map_err(|_| Error::Transport(TransportError::Abandoned))?
        .clone();
    outcome.unwrap_or(Err(Error::Transport(TransportError::Abandoned)))
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
