// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flow lookup and triggering across both flow kinds.

use serde::Serialize;

use crate::error::{AmbiguityError, NotFoundError, PolicyError, Result};
use crate::protocol::HubApi;
use crate::types::{Flow, FlowKind, FlowSummary};
use crate::write::WriteStatus;

/// A flow together with its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEntry {
    /// Which collection the flow belongs to.
    pub kind: FlowKind,
    /// The flow itself.
    pub flow: Flow,
}

impl FlowEntry {
    /// Returns the listing row for this flow.
    #[must_use]
    pub fn summary(&self) -> FlowSummary {
        self.flow.summary(self.kind)
    }
}

/// Outcome of a flow trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerResult {
    /// Flow id.
    pub id: String,
    /// Flow name.
    pub name: String,
    /// Flow kind.
    #[serde(rename = "type")]
    pub kind: FlowKind,
    /// Whether the trigger was sent.
    #[serde(flatten)]
    pub status: WriteStatus,
}

/// Fetches flows then advanced flows.
///
/// # Errors
///
/// Returns the hub's error if either list cannot be fetched.
pub async fn all_flows<H: HubApi>(hub: &H) -> Result<Vec<FlowEntry>> {
    let (flows, advanced) = tokio::join!(hub.flows(FlowKind::Flow), hub.flows(FlowKind::Advanced));

    let entries = flows?
        .into_values()
        .map(|flow| FlowEntry {
            kind: FlowKind::Flow,
            flow,
        })
        .chain(advanced?.into_values().map(|flow| FlowEntry {
            kind: FlowKind::Advanced,
            flow,
        }))
        .collect();
    Ok(entries)
}

/// Finds a flow by id, looking at flows before advanced flows.
///
/// # Errors
///
/// Returns [`NotFoundError::Flow`] when no flow has this id.
pub fn find_by_id<'a>(entries: &'a [FlowEntry], flow_id: &str) -> Result<&'a FlowEntry> {
    entries
        .iter()
        .find(|entry| entry.flow.id == flow_id)
        .ok_or_else(|| NotFoundError::Flow(flow_id.to_string()).into())
}

/// Finds a flow by name, ignoring case.
///
/// When several flows share the name, `strict` turns that into an error;
/// otherwise the first match wins.
///
/// # Errors
///
/// Returns [`NotFoundError::FlowName`] when nothing matches, and
/// [`AmbiguityError::Flows`] for several matches under `strict`.
///
/// # Examples
///
/// ```
/// use homey_cli::flows::{FlowEntry, find_by_name};
/// use homey_cli::types::{Flow, FlowKind};
///
/// let entries = vec![
///     FlowEntry { kind: FlowKind::Flow, flow: Flow::new("f1", "Good night") },
///     FlowEntry { kind: FlowKind::Advanced, flow: Flow::new("a1", "good NIGHT") },
/// ];
///
/// assert_eq!(find_by_name(&entries, "GOOD NIGHT", false).unwrap().flow.id, "f1");
/// assert!(find_by_name(&entries, "good night", true).is_err());
/// assert!(find_by_name(&entries, "good", false).is_err());
/// ```
pub fn find_by_name<'a>(
    entries: &'a [FlowEntry],
    name: &str,
    strict: bool,
) -> Result<&'a FlowEntry> {
    let wanted = name.trim().to_lowercase();
    let matches: Vec<&FlowEntry> = entries
        .iter()
        .filter(|entry| entry.flow.name.to_lowercase() == wanted)
        .collect();

    match matches.as_slice() {
        [] => Err(NotFoundError::FlowName(name.trim().to_string()).into()),
        [only] => Ok(*only),
        [first, ..] if !strict => {
            tracing::warn!(
                name = name.trim(),
                count = matches.len(),
                chosen = %first.flow.id,
                "several flows share this name, using the first"
            );
            Ok(*first)
        }
        _ => Err(AmbiguityError::Flows {
            name: name.trim().to_string(),
            matches: matches.iter().map(|entry| entry.summary()).collect(),
        }
        .into()),
    }
}

/// Triggers a flow, or only checks it when `dry_run` is set.
///
/// # Errors
///
/// Returns [`PolicyError::NotTriggerable`] when the flow says it cannot be
/// started manually, or the hub's error for the trigger itself.
pub async fn trigger<H: HubApi>(hub: &H, entry: &FlowEntry, dry_run: bool) -> Result<TriggerResult> {
    let flow = &entry.flow;
    if !flow.is_triggerable() {
        return Err(PolicyError::NotTriggerable {
            id: flow.id.clone(),
            name: flow.name.clone(),
        }
        .into());
    }

    if dry_run {
        tracing::debug!(flow = %flow.id, kind = %entry.kind, "dry run, not triggering");
    } else {
        hub.trigger_flow(entry.kind, &flow.id).await?;
        tracing::debug!(flow = %flow.id, kind = %entry.kind, "flow triggered");
    }

    Ok(TriggerResult {
        id: flow.id.clone(),
        name: flow.name.clone(),
        kind: entry.kind,
        status: WriteStatus::for_run(dry_run),
    })
}
