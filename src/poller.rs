// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic per-device refresh.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, trace, warn};

use crate::cache::StateCache;
use crate::error::Error;
use crate::event::DeviceId;
use crate::transport::DeviceTransport;

/// Consecutive failures logged at `warn` before going quiet.
const LOUD_FAILURES: u32 = 3;

/// One refresh task per device on a fixed period.
///
/// The first tick fires immediately. A tick that finds a fetch already in
/// flight for the device is skipped, and ticks missed while a fetch runs
/// long are not replayed. Failures are logged, never surfaced; the cache
/// keeps its previous state. Dropping the poller stops every task.
pub struct Poller<T> {
    cache: StateCache<T>,
    period: Duration,
    tasks: Mutex<HashMap<DeviceId, JoinHandle<()>>>,
}

impl<T: DeviceTransport> Poller<T> {
    /// Creates a poller refreshing `cache` every `period`.
    ///
    /// A zero period is raised to one millisecond.
    #[must_use]
    pub fn new(cache: StateCache<T>, period: Duration) -> Self {
        Self {
            cache,
            period: period.max(Duration::from_millis(1)),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the polling period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts polling `device_id`. Does nothing if it is already polled.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&self, device_id: &DeviceId) {
        let mut tasks = self.tasks.lock();
        if tasks.get(device_id).is_some_and(|task| !task.is_finished()) {
            return;
        }

        debug!(%device_id, period_ms = self.period.as_millis(), "Starting poller");
        let handle = tokio::spawn(poll_device(
            self.cache.clone(),
            device_id.clone(),
            self.period,
        ));
        tasks.insert(device_id.clone(), handle);
    }

    /// Stops polling `device_id`. Returns `false` if it was not polled.
    ///
    /// A fetch already issued is not cancelled.
    pub fn stop(&self, device_id: &DeviceId) -> bool {
        let Some(handle) = self.tasks.lock().remove(device_id) else {
            return false;
        };
        handle.abort();
        debug!(%device_id, "Stopped poller");
        true
    }

    /// Returns `true` if a task is polling `device_id`.
    #[must_use]
    pub fn is_polling(&self, device_id: &DeviceId) -> bool {
        self.tasks
            .lock()
            .get(device_id)
            .is_some_and(|task| !task.is_finished())
    }
}

impl<T> Poller<T> {
    /// Stops every task.
    pub fn stop_all(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            debug!(devices = tasks.len(), "Stopping all pollers");
        }
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

impl<T> std::fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("period", &self.period)
            .field("devices", &self.tasks.lock().len())
            .finish_non_exhaustive()
    }
}

async fn poll_device<T: DeviceTransport>(cache: StateCache<T>, device_id: DeviceId, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut consecutive_failures = 0u32;

    loop {
        ticker.tick().await;

        match cache.poll(&device_id).await {
            Ok(Some(_)) => {
                if consecutive_failures > 0 {
                    debug!(%device_id, consecutive_failures, "Poll recovered");
                }
                consecutive_failures = 0;
            }
            Ok(None) => trace!(%device_id, "Poll tick skipped"),
            Err(Error::DeviceNotFound(_)) => {
                debug!(%device_id, "Device gone, poller exiting");
                break;
            }
            Err(e) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
                if consecutive_failures <= LOUD_FAILURES {
                    warn!(%device_id, error = %e, attempt = consecutive_failures, "Poll failed");
                } else {
                    debug!(%device_id, error = %e, attempt = consecutive_failures, "Poll failed");
                }
            }
        }
    }
}
