// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the climate translation core.
//!
//! The hierarchy separates three failure classes:
//!
//! - [`MalformedStateError`]: raw device state (or a requested intent) fails
//!   validation. Local, never retried.
//! - [`TransportError`]: the remote fetch or command call failed or timed out.
//! - [`CommandFailedError`]: a write was not acknowledged by the remote side.
//!
//! All error types are `Clone` because a single in-flight fetch result is
//! handed to every caller waiting on it.

use std::fmt;

use thiserror::Error;

use crate::event::DeviceId;
use crate::state::Field;

/// The main error type for this library.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Raw state or an intent value failed validation.
    #[error("malformed state: {0}")]
    Malformed(#[from] MalformedStateError),

    /// The remote API could not be reached or answered badly.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A command was rejected or not acknowledged.
    #[error(transparent)]
    CommandFailed(#[from] CommandFailedError),

    /// A value could not be constructed.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The device is not registered.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// The field cannot be written.
    #[error("field {0} is read-only")]
    ReadOnlyField(Field),

    /// The device never reported this optional capability.
    #[error("device does not support {0}")]
    CapabilityNotSupported(Field),
}

impl Error {
    /// Returns `true` if the error originated in the remote transport.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Raw state (or a desired value) failed validation.
///
/// Carries the name of the offending field so the host can log precisely
/// which property the device reported badly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field `{field}` {reason}")]
pub struct MalformedStateError {
    field: String,
    reason: MalformedReason,
}

impl MalformedStateError {
    /// The field is absent from the raw state.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: MalformedReason::Missing,
        }
    }

    /// The field holds a value of the wrong JSON type.
    #[must_use]
    pub fn wrong_type(field: impl Into<String>, expected: &'static str, found: impl fmt::Display) -> Self {
        Self {
            field: field.into(),
            reason: MalformedReason::WrongType {
                expected,
                found: found.to_string(),
            },
        }
    }

    /// The field holds a value outside its valid domain.
    #[must_use]
    pub fn out_of_range(field: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            field: field.into(),
            reason: MalformedReason::OutOfRange {
                value: value.to_string(),
            },
        }
    }

    /// Returns the name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns why validation failed.
    #[must_use]
    pub fn reason(&self) -> &MalformedReason {
        &self.reason
    }
}

/// Why a field failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Field not present.
    #[error("is missing")]
    Missing,

    /// Field present with an unexpected type.
    #[error("expected {expected}, found {found}")]
    WrongType {
        /// Human readable description of the expected type.
        expected: &'static str,
        /// The value actually found.
        found: String,
    },

    /// Field present but outside the valid domain.
    #[error("value {value} is out of range")]
    OutOfRange {
        /// The offending value.
        value: String,
    },
}

/// Errors raised by the remote transport collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not complete within the configured timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The remote endpoint could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The remote endpoint answered with an unexpected HTTP status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Authentication was refused.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The remote API reported an application-level error.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The fetch was dropped before producing a result.
    #[error("fetch abandoned before completion")]
    Abandoned,
}

/// A write was rejected or not acknowledged by the remote side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("command for {field} on device {device_id} failed: {source}")]
pub struct CommandFailedError {
    /// The device the command targeted.
    pub device_id: DeviceId,
    /// The field the command tried to change.
    pub field: Field,
    /// The underlying transport failure.
    #[source]
    pub source: TransportError,
}

/// Errors related to constructing constrained values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The value that was provided.
        actual: i64,
    },

    /// A floating point value is NaN or infinite.
    #[error("value is not a finite number")]
    NotFinite,

    /// A value of the wrong kind was supplied for a field.
    #[error("{field} expects a {expected} value")]
    FieldMismatch {
        /// The field being written.
        field: Field,
        /// The kind of value the field accepts.
        expected: &'static str,
    },

    /// A field name was not recognized.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A mode name was not recognized.
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_names_field() {
        let err = MalformedStateError::wrong_type("temperature", "number", "\"N/A\"");
        assert_eq!(err.field(), "temperature");
        assert_eq!(
            err.to_string(),
            "field `temperature` expected number, found \"N/A\""
        );
    }

    #[test]
    fn missing_field_display() {
        let err = MalformedStateError::missing("templevel");
        assert_eq!(err.to_string(), "field `templevel` is missing");
        assert_eq!(err.reason(), &MalformedReason::Missing);
    }

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn command_failed_names_device_and_field() {
        let err = CommandFailedError {
            device_id: DeviceId::new("AC-01"),
            field: Field::TargetTemperature,
            source: TransportError::Timeout(500),
        };
        let text = err.to_string();
        assert!(text.contains("AC-01"));
        assert!(text.contains("targetTemperatureC"));
        assert!(text.contains("500 ms"));
    }

    #[test]
    fn error_from_transport_error() {
        let err: Error = TransportError::AuthenticationFailed.into();
        assert!(err.is_transport());
        assert!(matches!(
            err,
            Error::Transport(TransportError::AuthenticationFailed)
        ));
    }
}
