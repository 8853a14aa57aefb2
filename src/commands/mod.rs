// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command handlers behind the `homey-cli` binary.
//!
//! Each handler works against the [`HubApi`]/[`AccountApi`] ports and
//! returns a [`Report`]: the JSON payload together with its human
//! rendering. Printing and flag handling live in the binary.
//!
//! # Command groups
//!
//! - [`auth`]: token login, status and logout
//! - [`hubs`]: list, select and identify hubs
//! - [`zones`], [`apps`], [`inventory`], [`catalog`]: read-only views
//! - [`devices`]: device views and capability writes
//! - [`flows`]: flow views and triggers
//!
//! [`HubApi`]: crate::protocol::HubApi
//! [`AccountApi`]: crate::protocol::AccountApi

pub mod apps;
pub mod auth;
pub mod catalog;
pub mod devices;
pub mod flows;
pub mod hubs;
pub mod inventory;
pub mod zones;

use serde_json::{Value, json};

use crate::error::{NotFoundError, Result};
use crate::output::format_table;
use crate::protocol::HubApi;
use crate::types::{Device, HubSummary, User};
use crate::write::CapabilityWriter;

/// Output of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Payload printed in JSON mode.
    pub data: Value,
    /// Text printed in human mode. Empty prints nothing.
    pub human: String,
}

impl Report {
    /// Creates a report.
    #[must_use]
    pub fn new(data: Value, human: impl Into<String>) -> Self {
        Self {
            data,
            human: human.into(),
        }
    }

    /// Creates a report whose human form is a table of `rows`, or `empty`
    /// when there are none.
    #[must_use]
    pub fn table(data: Value, rows: &[Value], columns: &[&str], empty: &str) -> Self {
        let human = if rows.is_empty() {
            empty.to_string()
        } else {
            format_table(rows, columns)
        };
        Self::new(data, human)
    }
}

/// Flags shared by the write commands.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Capability writer with the effective allowlist.
    pub writer: CapabilityWriter,
    /// Validate without writing or triggering.
    pub dry_run: bool,
    /// Turn ambiguous name matches into errors.
    pub strict: bool,
}

/// Fetches one device by id.
pub(crate) async fn find_device<H: HubApi>(hub: &H, device_id: &str) -> Result<Device> {
    hub.devices()
        .await?
        .remove(device_id)
        .ok_or_else(|| NotFoundError::Device(device_id.to_string()).into())
}

pub(crate) fn hub_json(hub: &HubSummary) -> Value {
    json!({
        "id": hub.id,
        "name": hub.name,
        "platform": hub.platform,
        "softwareVersion": hub.software_version,
    })
}

pub(crate) fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
    })
}
