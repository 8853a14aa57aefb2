// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ports to the hub and the cloud account, and their HTTP implementations.
//!
//! Everything above this module talks to a hub through [`HubApi`] and to the
//! account through [`AccountApi`], so command logic can be exercised with
//! in-memory fakes.
//!
//! # Implementations
//!
//! - [`HttpHubClient`]: the hub's REST manager API
//! - [`CloudClient`]: the cloud account API, which also hands out hub sessions
//! - [`MemoryHub`], [`MemoryAccount`]: fixed in-memory data that records writes

#[cfg(feature = "http")]
mod cloud;
#[cfg(feature = "http")]
mod http;
mod memory;

#[cfg(feature = "http")]
pub use cloud::CloudClient;
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpHubClient};
pub use memory::{MemoryAccount, MemoryHub, RecordedWrite};

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::UpstreamError;
use crate::types::{App, Device, Flow, FlowKind, HubSummary, User, Zone};

/// Id-keyed collection as returned by the hub's manager endpoints.
pub type IdMap<T> = BTreeMap<String, T>;

/// Read and write access to one hub.
#[allow(async_fn_in_trait)]
pub trait HubApi {
    /// Fetches all zones.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the request fails.
    async fn zones(&self) -> Result<IdMap<Zone>, UpstreamError>;

    /// Fetches all devices with their capability descriptors.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the request fails.
    async fn devices(&self) -> Result<IdMap<Device>, UpstreamError>;

    /// Fetches all installed apps.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the request fails.
    async fn apps(&self) -> Result<IdMap<App>, UpstreamError>;

    /// Fetches the flows of one kind.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the request fails.
    async fn flows(&self, kind: FlowKind) -> Result<IdMap<Flow>, UpstreamError>;

    /// Writes one capability value on one device.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the hub refuses or the request fails.
    async fn set_capability_value(
        &self,
        device_id: &str,
        capability_id: &str,
        value: &Value,
    ) -> Result<(), UpstreamError>;

    /// Triggers a flow of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the hub refuses or the request fails.
    async fn trigger_flow(&self, kind: FlowKind, flow_id: &str) -> Result<(), UpstreamError>;
}

/// The authenticated cloud account.
#[allow(async_fn_in_trait)]
pub trait AccountApi {
    /// Session type for a connected hub.
    type Hub: HubApi;

    /// Fetches the account and the hubs it owns.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Unauthorized` when the token is rejected.
    async fn user(&self) -> Result<User, UpstreamError>;

    /// Opens a session on one of the account's hubs.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the hub cannot be reached or refuses the session.
    async fn connect(&self, hub: &HubSummary) -> Result<Self::Hub, UpstreamError>;
}
