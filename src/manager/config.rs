// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Climate manager configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::DEFAULT_CHANNEL_CAPACITY;

/// Timing and capacity settings for a [`ClimateManager`](super::ClimateManager).
///
/// Deserializes from millisecond fields so a host can embed it in its own
/// configuration file. Missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use dreo_climate::ClimateConfig;
/// use std::time::Duration;
///
/// // Defaults: poll every 30 s, stale after 60 s, 10 s request timeout
/// let config = ClimateConfig::default();
/// assert_eq!(config.staleness_threshold(), Duration::from_secs(60));
///
/// // The threshold follows the poll interval unless set explicitly
/// let config = ClimateConfig::default().with_poll_interval(Duration::from_secs(10));
/// assert_eq!(config.staleness_threshold(), Duration::from_secs(20));
///
/// let config: ClimateConfig =
///     serde_json::from_str(r#"{"poll_interval_ms": 15000, "request_timeout_ms": 2000}"#).unwrap();
/// assert_eq!(config.poll_interval(), Duration::from_secs(15));
/// assert_eq!(config.request_timeout(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    #[serde(rename = "poll_interval_ms", with = "millis")]
    poll_interval: Duration,
    #[serde(
        rename = "staleness_threshold_ms",
        with = "optional_millis",
        skip_serializing_if = "Option::is_none"
    )]
    staleness_threshold: Option<Duration>,
    #[serde(rename = "request_timeout_ms", with = "millis")]
    request_timeout: Duration,
    event_capacity: usize,
}

impl ClimateConfig {
    /// Default poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
    /// Default bound on every remote call.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the staleness threshold explicitly.
    #[must_use]
    pub fn with_staleness_threshold(mut self, threshold: Duration) -> Self {
        self.staleness_threshold = Some(threshold);
        self
    }

    /// Sets the timeout applied to every fetch and command.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the event bus capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the staleness threshold, twice the poll interval by default.
    #[must_use]
    pub fn staleness_threshold(&self) -> Duration {
        self.staleness_threshold
            .unwrap_or_else(|| self.poll_interval.saturating_mul(2))
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the event bus capacity.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            staleness_threshold: None,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => super::millis::serialize(duration, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClimateConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.event_capacity(), 256);
    }

    #[test]
    fn explicit_threshold_wins() {
        let config = ClimateConfig::default()
            .with_staleness_threshold(Duration::from_secs(5))
            .with_poll_interval(Duration::from_secs(100));
        assert_eq!(config.staleness_threshold(), Duration::from_secs(5));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: ClimateConfig =
            serde_json::from_str(r#"{"staleness_threshold_ms": 90000, "event_capacity": 16}"#)
                .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.staleness_threshold(), Duration::from_secs(90));
        assert_eq!(config.event_capacity(), 16);
    }

    #[test]
    fn serializes_millis() {
        let json = serde_json::to_value(ClimateConfig::default()).unwrap();
        assert_eq!(json["poll_interval_ms"], 30_000);
        assert_eq!(json["request_timeout_ms"], 10_000);
        assert!(json.get("staleness_threshold_ms").is_none());
    }
}
