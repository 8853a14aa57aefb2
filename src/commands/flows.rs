// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `flows` commands.

use serde_json::{Value, json};

use super::{Options, Report};
use crate::context::HubContext;
use crate::error::{Error, Result};
use crate::flows::{self, FlowEntry, TriggerResult};
use crate::protocol::HubApi;
use crate::types::FlowKind;

/// Lists flows, then advanced flows.
///
/// # Errors
///
/// Returns the hub's error if either list cannot be fetched.
pub async fn list<H: HubApi>(ctx: &HubContext<H>) -> Result<Report> {
    let entries = flows::all_flows(&ctx.api).await?;
    let rows: Vec<Value> = entries.iter().map(|entry| json!(entry.summary())).collect();

    Ok(Report::table(
        json!({ "flows": rows }),
        &rows,
        &["id", "name", "type", "enabled", "triggerable", "broken"],
        "No flows found.",
    ))
}

/// Shows one flow of either kind.
///
/// # Errors
///
/// Returns [`NotFoundError::Flow`](crate::error::NotFoundError::Flow) for an unknown id.
pub async fn get<H: HubApi>(ctx: &HubContext<H>, flow_id: &str) -> Result<Report> {
    let entries = flows::all_flows(&ctx.api).await?;
    let entry = flows::find_by_id(&entries, flow_id)?;

    Ok(Report::new(
        json!({ "type": entry.kind, "flow": entry.flow }),
        format!("{} ({})", entry.flow.name, entry.flow.id),
    ))
}

fn trigger_report(result: &TriggerResult) -> Report {
    let noun = match result.kind {
        FlowKind::Flow => "flow",
        FlowKind::Advanced => "advanced flow",
    };
    let target = format!("{noun} {} ({})", result.name, result.id);
    let human = if result.status.is_dry_run() {
        format!("Dry run: would trigger {target}")
    } else {
        format!("Triggered {target}")
    };

    Report::new(json!(result), human)
}

async fn run<H: HubApi>(ctx: &HubContext<H>, options: &Options, entry: &FlowEntry) -> Result<Report> {
    let result = flows::trigger(&ctx.api, entry, options.dry_run).await?;
    Ok(trigger_report(&result))
}

/// Triggers a flow by id.
///
/// # Errors
///
/// Returns a not-found error for an unknown id, a policy error for a
/// flow that cannot be started manually, or the hub's error.
pub async fn trigger<H: HubApi>(
    ctx: &HubContext<H>,
    options: &Options,
    flow_id: &str,
) -> Result<Report> {
    let entries = flows::all_flows(&ctx.api).await?;
    let entry = flows::find_by_id(&entries, flow_id)?;
    run(ctx, options, entry).await
}

/// Triggers a flow by its name, matched without regard to case.
///
/// # Errors
///
/// Returns a usage error for an empty name, then any error of
/// [`find_by_name`](crate::flows::find_by_name) or [`trigger`].
pub async fn trigger_by_name<H: HubApi>(
    ctx: &HubContext<H>,
    options: &Options,
    name: &str,
) -> Result<Report> {
    if name.trim().is_empty() {
        return Err(Error::Usage(
            "Usage: homey-cli flows trigger-by-name \"<flow name>\"".to_string(),
        ));
    }

    let entries = flows::all_flows(&ctx.api).await?;
    let entry = flows::find_by_name(&entries, name, options.strict)?;
    run(ctx, options, entry).await
}
