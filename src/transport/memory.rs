// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process transport with scripted responses.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::TransportError;
use crate::event::DeviceId;
use crate::translate::RawDeviceState;

use super::DeviceTransport;

/// A command recorded by [`InMemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentCommand {
    /// Target device.
    pub device_id: DeviceId,
    /// Vendor property.
    pub property: String,
    /// Payload as sent.
    pub payload: Value,
}

struct ScriptedFetch {
    result: Result<RawDeviceState, TransportError>,
    delay: Duration,
}

/// A fake vendor cloud holding one raw state per device.
///
/// Fetches return the stored state unless a scripted response is queued for
/// the device, in which case the oldest one is consumed. Acknowledged
/// commands are recorded and written into the stored state, so a later fetch
/// observes them. Delays use `tokio::time::sleep` and work with paused time.
///
/// # Examples
///
/// ```
/// use dreo_climate::event::DeviceId;
/// use dreo_climate::transport::{DeviceTransport, InMemoryTransport};
/// use dreo_climate::translate::RawDeviceState;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = InMemoryTransport::new();
/// let id = DeviceId::new("AC-1");
/// transport.set_state(&id, RawDeviceState::new().with("poweron", false));
///
/// transport
///     .send_command(&id, "poweron", serde_json::json!({"state": true}))
///     .await
///     .unwrap();
///
/// let raw = transport.fetch_state(&id).await.unwrap();
/// assert_eq!(raw.get("poweron"), Some(&serde_json::json!(true)));
/// # }
/// ```
#[derive(Default)]
pub struct InMemoryTransport {
    states: Mutex<HashMap<DeviceId, RawDeviceState>>,
    scripted: Mutex<HashMap<DeviceId, VecDeque<ScriptedFetch>>>,
    fetch_delay: Mutex<Duration>,
    command_delay: Mutex<Duration>,
    command_failure: Mutex<Option<TransportError>>,
    commands: Mutex<Vec<SentCommand>>,
    fetches: AtomicUsize,
}

impl InMemoryTransport {
    /// Creates a transport with no devices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the raw state returned by unscripted fetches.
    pub fn set_state(&self, device_id: &DeviceId, raw: RawDeviceState) {
        self.states.lock().insert(device_id.clone(), raw);
    }

    /// Returns the stored raw state.
    #[must_use]
    pub fn state(&self, device_id: &DeviceId) -> Option<RawDeviceState> {
        self.states.lock().get(device_id).cloned()
    }

    /// Queues a response for the next fetch of `device_id`.
    pub fn push_fetch(
        &self,
        device_id: &DeviceId,
        result: Result<RawDeviceState, TransportError>,
        delay: Duration,
    ) {
        self.scripted
            .lock()
            .entry(device_id.clone())
            .or_default()
            .push_back(ScriptedFetch { result, delay });
    }

    /// Delays every unscripted fetch.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock() = delay;
    }

    /// Delays every command.
    pub fn set_command_delay(&self, delay: Duration) {
        *self.command_delay.lock() = delay;
    }

    /// Makes every command fail with `error` until cleared with `None`.
    pub fn fail_commands(&self, error: Option<TransportError>) {
        *self.command_failure.lock() = error;
    }

    /// Returns the acknowledged commands, oldest first.
    #[must_use]
    pub fn sent_commands(&self) -> Vec<SentCommand> {
        self.commands.lock().clone()
    }

    /// Returns how many fetches have started.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTransport")
            .field("devices", &self.states.lock().len())
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}

impl DeviceTransport for InMemoryTransport {
    async fn fetch_state(&self, device_id: &DeviceId) -> Result<RawDeviceState, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .scripted
            .lock()
            .get_mut(device_id)
            .and_then(VecDeque::pop_front);

        if let Some(ScriptedFetch { result, delay }) = scripted {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            return result;
        }

        let delay = *self.fetch_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.states
            .lock()
            .get(device_id)
            .cloned()
            .ok_or_else(|| TransportError::Rejected(format!("unknown device {device_id}")))
    }

    async fn send_command(
        &self,
        device_id: &DeviceId,
        property: &str,
        payload: Value,
    ) -> Result<(), TransportError> {
        let delay = *self.command_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.command_failure.lock().clone() {
            return Err(error);
        }

        if let Some(value) = payload.get("state")
            && let Some(raw) = self.states.lock().get_mut(device_id)
        {
            raw.insert(property, value.clone());
        }

        self.commands.lock().push(SentCommand {
            device_id: device_id.clone(),
            property: property.to_string(),
            payload,
        });
        Ok(())
    }
}
