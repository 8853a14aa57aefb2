// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flows and advanced flows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two kinds of automation the hub knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// A classic when/and/then flow.
    Flow,
    /// An advanced (canvas) flow.
    Advanced,
}

impl FlowKind {
    /// Returns the label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flow as returned by the hub. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Flow identifier.
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Whether the flow is enabled.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub enabled: bool,
    /// Whether the flow can be started manually. Absent means yes.
    #[serde(default)]
    pub triggerable: Option<bool>,
    /// Whether the flow references missing cards.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub broken: bool,
    /// Remaining fields, kept for `flows get`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Flow {
    /// Creates an enabled flow.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            triggerable: None,
            broken: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Returns whether the flow may be triggered. Only an explicit `false` refuses.
    #[must_use]
    pub fn is_triggerable(&self) -> bool {
        self.triggerable != Some(false)
    }

    /// Returns the summary row for this flow.
    #[must_use]
    pub fn summary(&self, kind: FlowKind) -> FlowSummary {
        FlowSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            kind,
            enabled: self.enabled,
            triggerable: self.triggerable,
            broken: self.broken,
        }
    }
}

/// A flow of either kind, as listed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    /// Flow identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flow kind.
    #[serde(rename = "type")]
    pub kind: FlowKind,
    /// Whether the flow is enabled.
    pub enabled: bool,
    /// Whether the flow can be started manually.
    pub triggerable: Option<bool>,
    /// Whether the flow references missing cards.
    pub broken: bool,
}
