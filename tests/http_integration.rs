// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP clients using wiremock.

use homey_cli::config::MemoryStore;
use homey_cli::context::HubContext;
use homey_cli::error::UpstreamError;
use homey_cli::protocol::{AccountApi, CloudClient, HttpConfig, HttpHubClient, HubApi};
use homey_cli::safety::AllowedCapabilities;
use homey_cli::types::{CapabilityType, FlowKind, HubSummary};
use homey_cli::write::CapabilityWriter;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hub_client(server: &MockServer) -> HttpHubClient {
    HttpConfig::new(server.uri())
        .with_token("session")
        .into_client()
        .unwrap()
}

fn cloud_client(server: &MockServer) -> CloudClient {
    CloudClient::from_config(HttpConfig::new(server.uri()).with_token("access")).unwrap()
}

fn devices_body() -> serde_json::Value {
    json!({
        "lamp-1": {
            "id": "lamp-1",
            "name": "Desk lamp",
            "zone": "office",
            "class": "light",
            "driverId": "homey:app:com.example:bulb",
            "available": true,
            "capabilities": ["onoff", "dim"],
            "capabilitiesObj": {
                "onoff": { "id": "onoff", "type": "boolean", "setable": true, "getable": true, "value": false },
                "dim": { "id": "dim", "type": "number", "min": 0, "max": 1, "setable": true, "value": 0.2, "units": "%" }
            }
        }
    })
}

// ============================================================================
// HttpHubClient Tests
// ============================================================================

mod hub_client {
    use super::*;

    #[tokio::test]
    async fn fetch_devices_with_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/manager/devices/device"))
            .and(header("authorization", "Bearer session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(devices_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let devices = hub_client(&mock_server).devices().await.unwrap();
        let lamp = &devices["lamp-1"];

        assert_eq!(lamp.name, "Desk lamp");
        assert_eq!(lamp.driver_id.as_deref(), Some("homey:app:com.example:bulb"));
        assert_eq!(
            lamp.capability("dim").unwrap().kind,
            Some(CapabilityType::Number)
        );
        assert_eq!(lamp.capability("dim").unwrap().max, Some(1.0));
    }

    #[tokio::test]
    async fn fetch_zones_and_apps() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/manager/zones/zone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "home": { "id": "home", "name": "Home", "parent": null },
                "office": { "id": "office", "name": "Office", "parent": "home" }
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/manager/apps/app"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "com.example": { "id": "com.example", "name": "Example", "version": "1.0.0", "enabled": true }
            })))
            .mount(&mock_server)
            .await;

        let client = hub_client(&mock_server);
        let zones = client.zones().await.unwrap();
        assert_eq!(zones["office"].parent.as_deref(), Some("home"));
        assert_eq!(zones["home"].parent, None);

        let apps = client.apps().await.unwrap();
        assert_eq!(apps["com.example"].version.as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn fetch_both_flow_kinds() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/manager/flow/flow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "f1": { "id": "f1", "name": "Morning", "enabled": true, "folder": "x" }
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/manager/flow/advancedflow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "a1": { "id": "a1", "name": "Evening", "enabled": false, "triggerable": false }
            })))
            .mount(&mock_server)
            .await;

        let client = hub_client(&mock_server);
        let flows = client.flows(FlowKind::Flow).await.unwrap();
        assert_eq!(flows["f1"].extra["folder"], "x");

        let advanced = client.flows(FlowKind::Advanced).await.unwrap();
        assert!(!advanced["a1"].is_triggerable());
    }

    #[tokio::test]
    async fn put_capability_value() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/manager/devices/device/lamp-1/capability/dim"))
            .and(header("authorization", "Bearer session"))
            .and(body_json(json!({ "value": 0.5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        hub_client(&mock_server)
            .set_capability_value("lamp-1", "dim", &json!(0.5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn path_segments_are_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/manager/flow/flow/a%20b/trigger"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        hub_client(&mock_server)
            .trigger_flow(FlowKind::Flow, "a b")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_advanced_flow() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/manager/flow/advancedflow/a1/trigger"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        hub_client(&mock_server)
            .trigger_flow(FlowKind::Advanced, "a1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unauthorized_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/manager/zones/zone"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let err = hub_client(&mock_server).zones().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unauthorized));
    }

    #[tokio::test]
    async fn server_error_carries_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = hub_client(&mock_server)
            .set_capability_value("lamp-1", "onoff", &json!(true))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/manager/apps/app"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = hub_client(&mock_server).apps().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode { .. }));
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/manager/devices/device"))
            .respond_with(ResponseTemplate::new(200).set_body_json(devices_body()))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = hub_client(&mock_server);
        let devices = client.devices().await.unwrap();
        let writer = CapabilityWriter::new(AllowedCapabilities::default());
        let result = writer
            .write(&client, &devices["lamp-1"], "dim", &json!("0.7"), true)
            .await
            .unwrap();

        assert!(result.is_dry_run());
        assert_eq!(result.value, json!(0.7));
    }
}

// ============================================================================
// CloudClient Tests
// ============================================================================

mod cloud_client {
    use super::*;

    fn user_body(remote_url: &str) -> serde_json::Value {
        json!({
            "_id": "u1",
            "fullname": "Ada Lovelace",
            "email": "ada@example.com",
            "homeys": [
                {
                    "_id": "h1",
                    "name": "Home",
                    "platform": "local",
                    "softwareVersion": "12.0.0",
                    "remoteUrl": remote_url
                }
            ]
        })
    }

    #[tokio::test]
    async fn fetch_user_and_hubs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user/me"))
            .and(header("authorization", "Bearer access"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(user_body("https://h1.example")),
            )
            .mount(&mock_server)
            .await;

        let user = cloud_client(&mock_server).user().await.unwrap();
        assert_eq!(user.label(), "Ada Lovelace");
        assert_eq!(user.homeys.len(), 1);
        assert_eq!(user.homeys[0].base_url(), "https://h1.example");
    }

    #[tokio::test]
    async fn rejected_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let err = cloud_client(&mock_server).user().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unauthorized));
    }

    #[tokio::test]
    async fn connect_exchanges_delegation_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/delegation/token"))
            .and(query_param("audience", "homey"))
            .and(header("authorization", "Bearer access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("delegation")))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/manager/users/login"))
            .and(body_json(json!({ "token": "delegation" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("session")))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/manager/zones/zone"))
            .and(header("authorization", "Bearer session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut hub = HubSummary::new("h1", "Home");
        hub.remote_url = Some(mock_server.uri());

        let session = cloud_client(&mock_server).connect(&hub).await.unwrap();
        assert_eq!(session.base_url(), mock_server.uri());
        assert!(session.zones().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hub_context_over_http() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_body(&mock_server.uri())))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/delegation/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "token": "delegation" })),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/manager/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("session")))
            .mount(&mock_server)
            .await;

        let cloud = cloud_client(&mock_server);
        let ctx = HubContext::connect(&cloud, &MemoryStore::new(), None)
            .await
            .unwrap();
        assert_eq!(ctx.hub.id, "h1");
        assert_eq!(ctx.user.email.as_deref(), Some("ada@example.com"));
    }
}
