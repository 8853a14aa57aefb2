// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory hub and account.
//!
//! Both serve fixed data and record every write and trigger they receive,
//! which makes them suitable for offline runs and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use serde_json::Value;

use super::{AccountApi, HubApi, IdMap};
use crate::error::UpstreamError;
use crate::types::{App, Device, Flow, FlowKind, HubSummary, User, Zone};

/// A capability write received by a [`MemoryHub`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    /// Target device.
    pub device_id: String,
    /// Written capability.
    pub capability_id: String,
    /// Written value.
    pub value: Value,
}

/// A hub backed by in-memory maps.
///
/// # Examples
///
/// ```
/// use homey_cli::protocol::{HubApi, MemoryHub};
/// use homey_cli::types::Zone;
///
/// # async fn example() -> homey_cli::Result<()> {
/// let hub = MemoryHub::new().with_zone(Zone::new("home", "Home", None));
/// assert_eq!(hub.zones().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryHub {
    zones: IdMap<Zone>,
    devices: IdMap<Device>,
    apps: IdMap<App>,
    flows: IdMap<Flow>,
    advanced_flows: IdMap<Flow>,
    accepted_writes: Option<usize>,
    writes: Mutex<Vec<RecordedWrite>>,
    triggers: Mutex<Vec<(FlowKind, String)>>,
}

impl MemoryHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a zone.
    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.insert(zone.id.clone(), zone);
        self
    }

    /// Adds a device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.insert(device.id.clone(), device);
        self
    }

    /// Adds an app.
    #[must_use]
    pub fn with_app(mut self, app: App) -> Self {
        self.apps.insert(app.id.clone(), app);
        self
    }

    /// Adds a flow of the given kind.
    #[must_use]
    pub fn with_flow(mut self, kind: FlowKind, flow: Flow) -> Self {
        self.collection_mut(kind).insert(flow.id.clone(), flow);
        self
    }

    /// Makes every capability write after the first `accepted` fail.
    #[must_use]
    pub fn failing_after(mut self, accepted: usize) -> Self {
        self.accepted_writes = Some(accepted);
        self
    }

    /// Returns the capability writes received so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().clone()
    }

    /// Returns the flow triggers received so far, in order.
    #[must_use]
    pub fn triggers(&self) -> Vec<(FlowKind, String)> {
        self.triggers.lock().clone()
    }

    const fn collection(&self, kind: FlowKind) -> &IdMap<Flow> {
        match kind {
            FlowKind::Flow => &self.flows,
            FlowKind::Advanced => &self.advanced_flows,
        }
    }

    fn collection_mut(&mut self, kind: FlowKind) -> &mut IdMap<Flow> {
        match kind {
            FlowKind::Flow => &mut self.flows,
            FlowKind::Advanced => &mut self.advanced_flows,
        }
    }
}

fn not_found(path: String) -> UpstreamError {
    UpstreamError::Status {
        status: 404,
        url: path,
    }
}

impl HubApi for MemoryHub {
    async fn zones(&self) -> Result<IdMap<Zone>, UpstreamError> {
        Ok(self.zones.clone())
    }

    async fn devices(&self) -> Result<IdMap<Device>, UpstreamError> {
        Ok(self.devices.clone())
    }

    async fn apps(&self) -> Result<IdMap<App>, UpstreamError> {
        Ok(self.apps.clone())
    }

    async fn flows(&self, kind: FlowKind) -> Result<IdMap<Flow>, UpstreamError> {
        Ok(self.collection(kind).clone())
    }

    async fn set_capability_value(
        &self,
        device_id: &str,
        capability_id: &str,
        value: &Value,
    ) -> Result<(), UpstreamError> {
        let has_capability = self
            .devices
            .get(device_id)
            .is_some_and(|device| device.capabilities_obj.contains_key(capability_id));
        if !has_capability {
            return Err(not_found(format!("{device_id}/{capability_id}")));
        }

        let mut writes = self.writes.lock();
        if self
            .accepted_writes
            .is_some_and(|accepted| writes.len() >= accepted)
        {
            return Err(UpstreamError::Other(format!(
                "write of {capability_id} on {device_id} rejected"
            )));
        }

        writes.push(RecordedWrite {
            device_id: device_id.to_string(),
            capability_id: capability_id.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    async fn trigger_flow(&self, kind: FlowKind, flow_id: &str) -> Result<(), UpstreamError> {
        if !self.collection(kind).contains_key(flow_id) {
            return Err(not_found(format!("{kind}/{flow_id}")));
        }
        self.triggers.lock().push((kind, flow_id.to_string()));
        Ok(())
    }
}

impl<T: HubApi> HubApi for Arc<T> {
    async fn zones(&self) -> Result<IdMap<Zone>, UpstreamError> {
        (**self).zones().await
    }

    async fn devices(&self) -> Result<IdMap<Device>, UpstreamError> {
        (**self).devices().await
    }

    async fn apps(&self) -> Result<IdMap<App>, UpstreamError> {
        (**self).apps().await
    }

    async fn flows(&self, kind: FlowKind) -> Result<IdMap<Flow>, UpstreamError> {
        (**self).flows(kind).await
    }

    async fn set_capability_value(
        &self,
        device_id: &str,
        capability_id: &str,
        value: &Value,
    ) -> Result<(), UpstreamError> {
        (**self)
            .set_capability_value(device_id, capability_id, value)
            .await
    }

    async fn trigger_flow(&self, kind: FlowKind, flow_id: &str) -> Result<(), UpstreamError> {
        (**self).trigger_flow(kind, flow_id).await
    }
}

/// An account backed by a fixed user and in-memory hubs.
///
/// Hubs listed on the user but not registered with [`MemoryAccount::with_hub`]
/// refuse connections.
#[derive(Debug, Default)]
pub struct MemoryAccount {
    user: User,
    hubs: BTreeMap<String, Arc<MemoryHub>>,
    connections: Mutex<Vec<String>>,
}

impl MemoryAccount {
    /// Creates an account for `user`.
    #[must_use]
    pub fn new(user: User) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    /// Registers the hub served for `hub_id`.
    #[must_use]
    pub fn with_hub(mut self, hub_id: impl Into<String>, hub: Arc<MemoryHub>) -> Self {
        self.hubs.insert(hub_id.into(), hub);
        self
    }

    /// Returns the ids of the hubs connected to so far, in order.
    #[must_use]
    pub fn connections(&self) -> Vec<String> {
        self.connections.lock().clone()
    }
}

impl AccountApi for MemoryAccount {
    type Hub = Arc<MemoryHub>;

    async fn user(&self) -> Result<User, UpstreamError> {
        Ok(self.user.clone())
    }

    async fn connect(&self, hub: &HubSummary) -> Result<Self::Hub, UpstreamError> {
        let session = self
            .hubs
            .get(&hub.id)
            .cloned()
            .ok_or_else(|| not_found(hub.id.clone()))?;
        self.connections.lock().push(hub.id.clone());
        Ok(session)
    }
}
