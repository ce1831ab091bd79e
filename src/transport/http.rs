// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the vendor cloud REST API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::TransportError;
use crate::event::DeviceId;
use crate::translate::RawDeviceState;

use super::DeviceTransport;

const STATE_PATH: &str = "/api/user-device/device/state";
const CONTROL_PATH: &str = "/api/user-device/device/control";

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the vendor cloud HTTP API.
///
/// Token acquisition is left to the host; the token is sent as a bearer
/// token on every request.
///
/// # Examples
///
/// ```
/// use dreo_climate::transport::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("https://app-api-us.dreo-cloud.com", "token")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "https://app-api-us.dreo-cloud.com");
/// ```
#[derive(Clone)]
pub struct HttpConfig {
    base_url: String,
    token: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the API at `base_url`.
    ///
    /// A trailing slash is dropped.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: token.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an [`HttpTransport`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_transport(self) -> Result<HttpTransport, TransportError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        Ok(HttpTransport {
            client,
            config: self,
        })
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// HttpTransport
// ============================================================================

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct StateData {
    mixed: RawDeviceState,
}

/// [`DeviceTransport`] over the vendor REST API.
///
/// - state: `GET {base}/api/user-device/device/state?deviceSn={id}`
/// - command: `POST {base}/api/user-device/device/control` with
///   `{"deviceSn": id, "params": {property: value}}`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpConfig,
}

impl HttpTransport {
    /// Returns the base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn state_url(&self, device_id: &DeviceId) -> String {
        format!(
            "{}{STATE_PATH}?deviceSn={}",
            self.config.base_url,
            urlencoding::encode(device_id.as_str())
        )
    }

    fn control_url(&self) -> String {
        format!("{}{CONTROL_PATH}", self.config.base_url)
    }

    fn map_send_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            let millis = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
            TransportError::Timeout(millis)
        } else {
            TransportError::ConnectionFailed(error.to_string())
        }
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, TransportError> {
        let response = request
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::AuthenticationFailed);
        }
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_send_error(&e))?;
        tracing::debug!(body = %body, "Received HTTP response");

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?;

        if envelope.code != 0 {
            return Err(TransportError::Rejected(
                envelope
                    .msg
                    .unwrap_or_else(|| format!("code {}", envelope.code)),
            ));
        }
        Ok(envelope)
    }
}

impl DeviceTransport for HttpTransport {
    async fn fetch_state(&self, device_id: &DeviceId) -> Result<RawDeviceState, TransportError> {
        let url = self.state_url(device_id);
        tracing::debug!(url = %url, "Fetching device state");

        let envelope: Envelope<StateData> = self.execute(self.client.get(&url)).await?;
        envelope
            .data
            .map(|data| data.mixed)
            .ok_or_else(|| TransportError::Decode("missing data.mixed".to_string()))
    }

    async fn send_command(
        &self,
        device_id: &DeviceId,
        property: &str,
        payload: Value,
    ) -> Result<(), TransportError> {
        let value = match payload {
            Value::Object(mut map) if map.contains_key("state") => {
                map.remove("state").unwrap_or(Value::Null)
            }
            other => other,
        };
        let body = json!({
            "deviceSn": device_id.as_str(),
            "params": { property: value },
        });

        tracing::debug!(%device_id, property, "Sending device command");

        let _: Envelope<Value> = self
            .execute(self.client.post(self.control_url()).json(&body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let config = HttpConfig::new("http://localhost:8080//", "t");
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn state_url_encodes_serial() {
        let transport = HttpConfig::new("http://api", "t").into_transport().unwrap();
        assert_eq!(
            transport.state_url(&DeviceId::new("AC 1")),
            "http://api/api/user-device/device/state?deviceSn=AC%201"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let config = HttpConfig::new("http://api", "secret-token");
        assert!(!format!("{config:?}").contains("secret-token"));
    }

    #[test]
    fn envelope_decodes_state() {
        let envelope: Envelope<StateData> = serde_json::from_value(json!({
            "code": 0,
            "msg": "OK",
            "data": {"mixed": {"poweron": {"state": true}}}
        }))
        .unwrap();
        let raw = envelope.data.unwrap().mixed;
        assert_eq!(raw.get("poweron"), Some(&json!(true)));
    }
}
