// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;
use std::sync::Arc;

/// Identifier of a managed device.
///
/// Wraps the vendor's device serial number. Cloning is cheap because the
/// string is shared.
///
/// # Examples
///
/// ```
/// use dreo_climate::event::DeviceId;
///
/// let id = DeviceId::new("HAC-0042");
/// assert_eq!(id.as_str(), "HAC-0042");
/// assert_eq!(id, DeviceId::from("HAC-0042"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Arc<str>);

impl DeviceId {
    /// Creates an identifier from a device serial number.
    #[must_use]
    pub fn new(serial: impl AsRef<str>) -> Self {
        Self(Arc::from(serial.as_ref()))
    }

    /// Returns the serial number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(serial: &str) -> Self {
        Self::new(serial)
    }
}

impl From<String> for DeviceId {
    fn from(serial: String) -> Self {
        Self(Arc::from(serial))
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
