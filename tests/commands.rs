// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end command tests over the in-memory hub and account.

use std::sync::Arc;

use homey_cli::commands::{Options, devices, flows, hubs, inventory};
use homey_cli::config::{ConfigStore, MemoryStore};
use homey_cli::context::HubContext;
use homey_cli::error::{Error, ErrorKind, UpstreamError};
use homey_cli::output::pick_fields;
use homey_cli::protocol::{MemoryAccount, MemoryHub};
use homey_cli::safety::AllowedCapabilities;
use homey_cli::types::{
    CapabilityDescriptor, CapabilityType, Device, Flow, FlowKind, HubSummary, User, Zone,
};
use homey_cli::write::CapabilityWriter;
use serde_json::json;

fn bulb() -> Device {
    let mut bulb = Device::new("bulb", "Hall bulb")
        .with_capability(CapabilityDescriptor::new("onoff", CapabilityType::Boolean).setable())
        .with_capability(
            CapabilityDescriptor::new("dim", CapabilityType::Number)
                .with_range(0.0, 1.0)
                .setable(),
        )
        .with_capability(
            CapabilityDescriptor::new("light_hue", CapabilityType::Number)
                .with_range(0.0, 1.0)
                .setable(),
        )
        .with_capability(
            CapabilityDescriptor::new("light_saturation", CapabilityType::Number)
                .with_range(0.0, 1.0)
                .setable(),
        )
        .with_capability(
            CapabilityDescriptor::new("button_reset", CapabilityType::Boolean).setable(),
        );
    bulb.zone = Some("hall".to_string());
    bulb
}

fn home_hub() -> MemoryHub {
    MemoryHub::new()
        .with_zone(Zone::new("hall", "Hall", None))
        .with_device(bulb())
        .with_flow(FlowKind::Flow, Flow::new("f1", "Leave home"))
        .with_flow(FlowKind::Advanced, Flow::new("a1", "Leave Home"))
}

fn account(home: Arc<MemoryHub>) -> MemoryAccount {
    let user = User {
        id: "u1".to_string(),
        name: Some("Ada".to_string()),
        homeys: vec![HubSummary::new("home", "Home"), HubSummary::new("cabin", "Cabin")],
        ..User::default()
    };
    MemoryAccount::new(user)
        .with_hub("home", home)
        .with_hub("cabin", Arc::new(MemoryHub::new()))
}

async fn connect(account: &MemoryAccount) -> HubContext<Arc<MemoryHub>> {
    HubContext::connect(account, &MemoryStore::with_active_hub("home"), None)
        .await
        .unwrap()
}

#[tokio::test]
async fn dry_run_never_reaches_the_hub() {
    let home = Arc::new(home_hub());
    let ctx = connect(&account(Arc::clone(&home))).await;
    let options = Options {
        dry_run: true,
        ..Options::default()
    };

    devices::set(&ctx, &options, "bulb", "dim=0.8").await.unwrap();
    devices::switch(&ctx, &options, "bulb", true).await.unwrap();
    devices::color(&ctx, &options, "bulb", "#3366ff").await.unwrap();
    flows::trigger(&ctx, &options, "f1").await.unwrap();

    assert!(home.writes().is_empty());
    assert!(home.triggers().is_empty());
}

#[tokio::test]
async fn dry_run_and_real_run_agree() {
    let home = Arc::new(home_hub());
    let ctx = connect(&account(Arc::clone(&home))).await;
    let dry = Options {
        dry_run: true,
        ..Options::default()
    };

    let planned = devices::dim(&ctx, &dry, "bulb", "0.35").await.unwrap();
    let applied = devices::dim(&ctx, &Options::default(), "bulb", "0.35")
        .await
        .unwrap();

    assert_eq!(planned.data["value"], applied.data["value"]);
    assert_eq!(home.writes().len(), 1);
    assert_eq!(home.writes()[0].value, json!(0.35));
}

#[tokio::test]
async fn allowlist_refuses_setable_capability() {
    let home = Arc::new(home_hub());
    let ctx = connect(&account(Arc::clone(&home))).await;

    let err = devices::set(&ctx, &Options::default(), "bulb", "button_reset=true")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Policy);
    assert_eq!(err.code(), "ERR_CAPABILITY_NOT_ALLOWED");
    assert!(home.writes().is_empty());
}

#[tokio::test]
async fn allowlist_override_replaces_defaults() {
    let home = Arc::new(home_hub());
    let ctx = connect(&account(Arc::clone(&home))).await;
    let options = Options {
        writer: CapabilityWriter::new(AllowedCapabilities::from_override(Some(
            "button_reset",
        ))),
        ..Options::default()
    };

    devices::set(&ctx, &options, "bulb", "button_reset=true")
        .await
        .unwrap();
    let err = devices::set(&ctx, &options, "bulb", "dim=0.5")
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ERR_CAPABILITY_NOT_ALLOWED");
    assert_eq!(home.writes().len(), 1);
}

#[tokio::test]
async fn two_hubs_without_selection_is_ambiguous() {
    let account = account(Arc::new(home_hub()));
    let err = HubContext::connect(&account, &MemoryStore::new(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Ambiguity);
    let ids: Vec<_> = err
        .hubs()
        .unwrap()
        .iter()
        .map(|hub| hub.id.as_str())
        .collect();
    assert_eq!(ids, vec!["home", "cabin"]);
    assert!(account.connections().is_empty());
}

#[tokio::test]
async fn explicit_hub_beats_persisted_selection() {
    let account = account(Arc::new(home_hub()));
    let ctx = HubContext::connect(&account, &MemoryStore::with_active_hub("home"), Some("cabin"))
        .await
        .unwrap();
    assert_eq!(ctx.hub.id, "cabin");
}

#[tokio::test]
async fn homey_use_then_connect() {
    let account = account(Arc::new(home_hub()));
    let store = MemoryStore::new();

    hubs::use_hub(&account, &store, "cabin").await.unwrap();
    assert_eq!(store.active_hub_id().unwrap().as_deref(), Some("cabin"));

    let ctx = HubContext::connect(&account, &store, None).await.unwrap();
    assert_eq!(ctx.hub.name, "Cabin");
}

#[tokio::test]
async fn failed_saturation_write_reports_partial_write() {
    let home = Arc::new(home_hub().failing_after(1));
    let ctx = connect(&account(Arc::clone(&home))).await;

    let err = devices::color(&ctx, &Options::default(), "bulb", "hsv:120,50,100")
        .await
        .unwrap_err();

    match err {
        Error::PartialWrite { applied, source } => {
            assert_eq!(applied.len(), 1);
            assert_eq!(applied[0].capability_id, "light_hue");
            assert!(matches!(source, UpstreamError::Other(_)));
        }
        other => panic!("expected a partial write, got {other:?}"),
    }
    assert_eq!(home.writes().len(), 1);
}

#[tokio::test]
async fn trigger_by_name_strict_and_lenient() {
    let home = Arc::new(home_hub());
    let ctx = connect(&account(Arc::clone(&home))).await;

    let strict = Options {
        strict: true,
        ..Options::default()
    };
    let err = flows::trigger_by_name(&ctx, &strict, "leave home")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ERR_FLOW_AMBIGUOUS");
    assert!(home.triggers().is_empty());

    let report = flows::trigger_by_name(&ctx, &Options::default(), "leave home")
        .await
        .unwrap();
    assert_eq!(report.human, "Triggered flow Leave home (f1)");
    assert_eq!(home.triggers(), vec![(FlowKind::Flow, "f1".to_string())]);
}

#[tokio::test]
async fn inventory_with_field_selection() {
    let ctx = connect(&account(Arc::new(home_hub()))).await;
    let report = inventory::inventory(&ctx).await.unwrap();

    let picked = pick_fields(report.data, &["homey".to_string(), "flows".to_string()]);
    assert_eq!(picked["homey"]["id"], "home");
    assert_eq!(picked["flows"].as_array().map(Vec::len), Some(2));
    assert!(picked.get("devices").is_none());
}
