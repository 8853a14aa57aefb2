// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `inventory`: hub, zones, devices and flows in one payload.

use serde_json::{Value, json};

use super::{Report, hub_json};
use crate::context::HubContext;
use crate::error::Result;
use crate::protocol::HubApi;
use crate::types::FlowKind;

/// Fetches zones, devices and both flow kinds concurrently.
///
/// # Errors
///
/// Returns the first hub error among the four requests.
pub async fn inventory<H: HubApi>(ctx: &HubContext<H>) -> Result<Report> {
    let (zones, devices, flows, advanced) = tokio::join!(
        ctx.api.zones(),
        ctx.api.devices(),
        ctx.api.flows(FlowKind::Flow),
        ctx.api.flows(FlowKind::Advanced),
    );
    let (zones, devices, flows, advanced) = (zones?, devices?, flows?, advanced?);

    let zones: Vec<Value> = zones
        .into_values()
        .map(|zone| json!({ "id": zone.id, "name": zone.name, "parent": zone.parent }))
        .collect();
    let devices: Vec<Value> = devices
        .into_values()
        .map(|device| {
            json!({
                "id": device.id,
                "name": device.name,
                "zone": device.zone,
                "class": device.class,
                "driver": device.driver_id,
                "capabilities": device.capabilities,
            })
        })
        .collect();
    let flows: Vec<Value> = flows
        .into_values()
        .map(|flow| (FlowKind::Flow, flow))
        .chain(advanced.into_values().map(|flow| (FlowKind::Advanced, flow)))
        .map(|(kind, flow)| json!({ "id": flow.id, "name": flow.name, "type": kind }))
        .collect();

    let human = [
        format!("{} ({})", ctx.hub.name, ctx.hub.id),
        format!("Zones: {}", zones.len()),
        format!("Devices: {}", devices.len()),
        format!("Flows: {}", flows.len()),
        "Use --json for full inventory payload.".to_string(),
    ]
    .join("\n");

    let data = json!({
        "homey": hub_json(&ctx.hub),
        "zones": zones,
        "devices": devices,
        "flows": flows,
    });
    Ok(Report::new(data, human))
}
