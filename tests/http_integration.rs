// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP transport using wiremock.

#![cfg(feature = "http")]

use std::time::Duration;

use dreo_climate::state::{Field, FieldValue};
use dreo_climate::transport::{DeviceTransport, HttpConfig, HttpTransport};
use dreo_climate::types::HvacMode;
use dreo_climate::{ClimateConfig, ClimateManager, DeviceId, Error, TransportError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATE_PATH: &str = "/api/user-device/device/state";
const CONTROL_PATH: &str = "/api/user-device/device/control";

fn transport(server: &MockServer) -> HttpTransport {
    HttpConfig::new(server.uri(), "secret-token")
        .with_timeout(Duration::from_millis(500))
        .into_transport()
        .unwrap()
}

fn state_body() -> serde_json::Value {
    json!({
        "code": 0,
        "msg": "OK",
        "data": {
            "mixed": {
                "poweron": {"state": true, "timestamp": 1_700_000_000},
                "mode": {"state": 1, "timestamp": 1_700_000_000},
                "temperature": {"state": 75, "timestamp": 1_700_000_000},
                "templevel": {"state": 68, "timestamp": 1_700_000_000},
                "windlevel": {"state": 3, "timestamp": 1_700_000_000},
                "oscmode": {"state": 0, "timestamp": 1_700_000_000}
            }
        }
    })
}

// ============================================================================
// Fetching state
// ============================================================================

mod fetch_state {
    use super::*;

    #[tokio::test]
    async fn unwraps_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .and(query_param("deviceSn", "HAC-0042"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .expect(1)
            .mount(&server)
            .await;

        let raw = transport(&server)
            .fetch_state(&DeviceId::new("HAC-0042"))
            .await
            .unwrap();

        assert_eq!(raw.len(), 6);
        assert_eq!(raw.get("templevel"), Some(&json!(68)));
        assert_eq!(raw.get("poweron"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn tolerates_unrelated_entries() {
        let server = MockServer::start().await;

        let mut body = state_body();
        body["data"]["mixed"]["deviceName"] = json!("Bedroom AC");
        body["data"]["mixed"]["childLock"] = json!({"enabled": false});
        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let raw = transport(&server)
            .fetch_state(&DeviceId::new("HAC-0042"))
            .await
            .unwrap();
        assert_eq!(raw.get("templevel"), Some(&json!(68)));
        assert_eq!(raw.get("deviceName"), None);

        let state = dreo_climate::translate::translate(&raw, chrono::Utc::now())
            .unwrap()
            .state;
        assert_eq!(state.fan_speed_percent(), 60);
    }

    #[tokio::test]
    async fn unauthorized_is_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = transport(&server).fetch_state(&DeviceId::new("AC-1")).await;
        assert_eq!(result, Err(TransportError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = transport(&server).fetch_state(&DeviceId::new("AC-1")).await;
        assert_eq!(result, Err(TransportError::Status(500)));
    }

    #[tokio::test]
    async fn nonzero_code_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 1001,
                "msg": "device offline",
                "data": null
            })))
            .mount(&server)
            .await;

        let result = transport(&server).fetch_state(&DeviceId::new("AC-1")).await;
        assert_eq!(
            result,
            Err(TransportError::Rejected("device offline".to_string()))
        );
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = transport(&server).fetch_state(&DeviceId::new("AC-1")).await;
        assert!(matches!(result, Err(TransportError::Decode(_))));
    }

    #[tokio::test]
    async fn missing_data_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .mount(&server)
            .await;

        let result = transport(&server).fetch_state(&DeviceId::new("AC-1")).await;
        assert!(matches!(result, Err(TransportError::Decode(_))));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(state_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let result = transport(&server).fetch_state(&DeviceId::new("AC-1")).await;
        assert_eq!(result, Err(TransportError::Timeout(500)));
    }
}

// ============================================================================
// Sending commands
// ============================================================================

mod send_command {
    use super::*;

    #[tokio::test]
    async fn posts_unwrapped_value() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CONTROL_PATH))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_json(json!({
                "deviceSn": "HAC-0042",
                "params": {"templevel": 71}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "OK"})))
            .expect(1)
            .mount(&server)
            .await;

        transport(&server)
            .send_command(&DeviceId::new("HAC-0042"), "templevel", json!({"state": 71}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejection_surfaces_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CONTROL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 2,
                "msg": "invalid param"
            })))
            .mount(&server)
            .await;

        let result = transport(&server)
            .send_command(&DeviceId::new("AC-1"), "mode", json!({"state": 9}))
            .await;
        assert_eq!(
            result,
            Err(TransportError::Rejected("invalid param".to_string()))
        );
    }
}

// ============================================================================
// End to end through the manager
// ============================================================================

mod manager {
    use super::*;

    #[tokio::test]
    async fn reads_translated_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&server)
            .await;

        let manager = ClimateManager::new(transport(&server), ClimateConfig::default());
        let id = DeviceId::new("HAC-0042");
        manager.register(id.clone());

        let snapshot = manager.state(&id).await.unwrap();
        assert!(snapshot.state.power_on());
        assert_eq!(snapshot.state.mode(), HvacMode::Cool);
        assert_eq!(snapshot.state.current_temperature().value(), 23.9);
        assert_eq!(snapshot.state.target_temperature().value(), 20.0);
        assert_eq!(snapshot.state.fan_speed_percent(), 60);
        assert_eq!(snapshot.state.swing_enabled(), Some(false));
    }

    #[tokio::test]
    async fn write_sends_fahrenheit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(CONTROL_PATH))
            .and(body_json(json!({
                "deviceSn": "HAC-0042",
                "params": {"templevel": 71}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let manager = ClimateManager::new(transport(&server), ClimateConfig::default());
        let id = DeviceId::new("HAC-0042");
        manager.register(id.clone());
        manager.state(&id).await.unwrap();

        let ack = manager
            .write(&id, Field::TargetTemperature, FieldValue::Number(21.5))
            .await
            .unwrap();
        let state = ack.state.unwrap();
        assert_eq!(state.target_temperature().value(), 21.5);
    }

    #[tokio::test]
    async fn rejected_write_is_command_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(CONTROL_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let manager = ClimateManager::new(transport(&server), ClimateConfig::default());
        let id = DeviceId::new("HAC-0042");
        manager.register(id.clone());
        manager.state(&id).await.unwrap();

        let result = manager
            .write(&id, Field::Power, FieldValue::Bool(false))
            .await;
        let Err(Error::CommandFailed(failure)) = result else {
            panic!("expected command failure, got {result:?}");
        };
        assert_eq!(failure.field, Field::Power);
        assert_eq!(failure.source, TransportError::Status(503));

        let cached = manager.cached_state(&id).unwrap().unwrap();
        assert!(cached.state.power_on());
    }
}
