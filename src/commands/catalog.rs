// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `capabilities catalog`.

use serde_json::{Value, json};

use super::Report;
use crate::catalog::build_catalog;
use crate::context::HubContext;
use crate::error::Result;
use crate::protocol::HubApi;

/// Lists every capability id in use on the hub.
///
/// # Errors
///
/// Returns the hub's error if devices cannot be fetched.
pub async fn catalog<H: HubApi>(ctx: &HubContext<H>) -> Result<Report> {
    let devices = ctx.api.devices().await?;
    let capabilities: Vec<Value> = build_catalog(devices.values())
        .iter()
        .map(|entry| json!(entry))
        .collect();

    Ok(Report::table(
        json!({ "capabilities": capabilities }),
        &capabilities,
        &["id", "type", "setable", "deviceCount", "min", "max", "unit"],
        "No capabilities found.",
    ))
}
