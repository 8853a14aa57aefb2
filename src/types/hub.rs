// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Account and hub summaries returned by the cloud API.

use serde::{Deserialize, Serialize};

/// Read-only projection of one hub owned by the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubSummary {
    /// Hub identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Platform (`local`, `cloud`, ...).
    #[serde(default)]
    pub platform: Option<String>,
    /// Installed software version.
    #[serde(default)]
    pub software_version: Option<String>,
    /// Remote access URL, when the cloud reports one.
    #[serde(default, skip_serializing)]
    pub remote_url: Option<String>,
}

impl HubSummary {
    /// Creates a summary with only an id and a name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform: None,
            software_version: None,
            remote_url: None,
        }
    }

    /// Returns the base URL used to reach this hub through the cloud relay.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.connect.athom.com", self.id))
    }
}

/// The authenticated account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Full name, when the cloud provides one.
    #[serde(default, alias = "fullname")]
    pub name: Option<String>,
    /// First name.
    #[serde(default, skip_serializing)]
    pub firstname: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing)]
    pub lastname: Option<String>,
    /// E-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Hubs owned by the account.
    #[serde(
        default,
        deserialize_with = "super::null_as_default",
        skip_serializing
    )]
    pub homeys: Vec<HubSummary>,
}

impl User {
    /// Returns the best available label: name, then e-mail, then id.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|name| !name.is_empty()) {
            return name.to_string();
        }
        let joined = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return joined;
        }
        self.email.clone().unwrap_or_else(|| self.id.clone())
    }
}
