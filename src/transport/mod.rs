// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote transport to the vendor cloud.
//!
//! The core only needs two calls: fetch the raw state of a device and send a
//! single property command. Authentication and connection handling belong to
//! the implementation.
//!
//! # Implementations
//!
//! - [`InMemoryTransport`]: scripted in-process device, for tests and demos
//! - [`HttpTransport`]: vendor REST API over `reqwest` (feature `http`)

#[cfg(feature = "http")]
mod http;
mod memory;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransport};
pub use memory::{InMemoryTransport, SentCommand};

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::TransportError;
use crate::event::DeviceId;
use crate::translate::RawDeviceState;

/// A pull-based state fetch and a push-based command call.
///
/// Futures must be `Send` because fetches run on spawned tasks. Callers
/// bound every call with their own timeout.
pub trait DeviceTransport: Send + Sync + 'static {
    /// Fetches the raw property map of a device.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the remote call fails.
    fn fetch_state(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<RawDeviceState, TransportError>> + Send;

    /// Sends one property command with a `{"state": value}` payload.
    ///
    /// Success means the remote side acknowledged the command, not that the
    /// device has applied it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the command was not acknowledged.
    fn send_command(
        &self,
        device_id: &DeviceId,
        property: &str,
        payload: Value,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl<T: DeviceTransport> DeviceTransport for Arc<T> {
    fn fetch_state(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<RawDeviceState, TransportError>> + Send {
        (**self).fetch_state(device_id)
    }

    fn send_command(
        &self,
        device_id: &DeviceId,
        property: &str,
        payload: Value,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).send_command(device_id, property, payload)
    }
}
