// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intent dispatch with optimistic cache reconciliation.

use tracing::{debug, warn};

use crate::cache::{StateCache, millis};
use crate::error::{CommandFailedError, Error, Result, TransportError};
use crate::event::DeviceId;
use crate::state::{Field, FieldValue};
use crate::transport::DeviceTransport;

use super::{Ack, Intent, PendingIntent};

/// Turns canonical intents into remote commands.
///
/// On acknowledgement the cached state is replaced by an optimistic copy and
/// the entry is marked for a confirmatory re-fetch. On failure the cache is
/// left untouched. Nothing is retried, and concurrent writes to the same
/// device are not serialized: the last optimistic update to complete wins.
#[derive(Debug, Clone)]
pub struct CommandDispatcher<T> {
    cache: StateCache<T>,
}

impl<T: DeviceTransport> CommandDispatcher<T> {
    /// Creates a dispatcher reconciling into `cache`.
    #[must_use]
    pub fn new(cache: StateCache<T>) -> Self {
        Self { cache }
    }

    /// Validates `value` for `field` and dispatches it.
    ///
    /// # Errors
    ///
    /// Fails before any remote call if the value is invalid (see
    /// [`Intent::new`]) or the device is unknown. Fails with
    /// [`Error::CommandFailed`] if the remote side does not acknowledge the
    /// command within the request timeout.
    pub async fn apply_intent(
        &self,
        device_id: &DeviceId,
        field: Field,
        value: FieldValue,
    ) -> Result<Ack> {
        let intent = Intent::new(field, value)?;
        self.dispatch(device_id, intent).await
    }

    /// Dispatches an already validated intent.
    ///
    /// # Errors
    ///
    /// Same as [`apply_intent`](Self::apply_intent), minus validation.
    pub async fn dispatch(&self, device_id: &DeviceId, intent: Intent) -> Result<Ack> {
        if !self.cache.contains(device_id) {
            return Err(Error::DeviceNotFound(device_id.clone()));
        }

        let pending = PendingIntent::new(device_id.clone(), intent, self.cache.clock().now());
        let command = intent.to_raw_command();
        debug!(
            %device_id,
            intent_id = %pending.id,
            field = %intent.field(),
            property = command.property,
            "Sending command"
        );

        let timeout = self.cache.request_timeout();
        let sent = tokio::time::timeout(
            timeout,
            self.cache
                .transport()
                .send_command(device_id, command.property, command.payload),
        )
        .await
        .unwrap_or(Err(TransportError::Timeout(millis(timeout))));

        if let Err(source) = sent {
            warn!(%device_id, intent_id = %pending.id, error = %source, "Command failed");
            return Err(CommandFailedError {
                device_id: pending.device_id,
                field: intent.field(),
                source,
            }
            .into());
        }

        let state = self.cache.apply_optimistic(device_id, &intent)?;
        Ok(Ack {
            intent_id: pending.id,
            device_id: pending.device_id,
            field: intent.field(),
            state,
        })
    }
}
