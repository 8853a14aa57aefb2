// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Devices, zones and apps as returned by the hub.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CapabilityDescriptor;
use crate::error::{NotFoundError, PolicyError};

/// A device paired with the hub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device identifier.
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Id of the zone the device lives in.
    #[serde(default)]
    pub zone: Option<String>,
    /// Device class (`light`, `socket`, ...).
    #[serde(default)]
    pub class: Option<String>,
    /// Driver identifier.
    #[serde(default)]
    pub driver_id: Option<String>,
    /// Whether the device is currently reachable.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub available: bool,
    /// Capability identifiers, in driver order.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub capabilities: Vec<String>,
    /// Capability descriptors keyed by capability id.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub capabilities_obj: BTreeMap<String, CapabilityDescriptor>,
}

impl Device {
    /// Creates a device with no capabilities.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available: true,
            ..Self::default()
        }
    }

    /// Adds a capability descriptor, keyed by its id.
    #[must_use]
    pub fn with_capability(mut self, descriptor: CapabilityDescriptor) -> Self {
        self.capabilities.push(descriptor.id.clone());
        self.capabilities_obj
            .insert(descriptor.id.clone(), descriptor);
        self
    }

    /// Returns the name used in messages: the display name, or the id when unnamed.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Returns the descriptor for `capability_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Capability`] when the device lacks it.
    pub fn capability(&self, capability_id: &str) -> Result<&CapabilityDescriptor, NotFoundError> {
        self.capabilities_obj
            .get(capability_id)
            .ok_or_else(|| NotFoundError::Capability {
                capability: capability_id.to_string(),
                device: self.label().to_string(),
            })
    }

    /// Returns the descriptor for `capability_id` if it accepts writes.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Capability`] when the device lacks the
    /// capability, or [`PolicyError::ReadOnly`] when it is not setable.
    pub fn setable_capability(
        &self,
        capability_id: &str,
    ) -> crate::Result<&CapabilityDescriptor> {
        let descriptor = self.capability(capability_id)?;
        if !descriptor.setable {
            return Err(PolicyError::ReadOnly {
                capability: capability_id.to_string(),
                device: self.label().to_string(),
            }
            .into());
        }
        Ok(descriptor)
    }
}

/// A zone (room, floor, ...). `parent` is `None` for roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone identifier.
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Parent zone id.
    #[serde(default)]
    pub parent: Option<String>,
}

impl Zone {
    /// Creates a zone.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: parent.map(str::to_string),
        }
    }
}

/// An app installed on the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// App identifier (reverse-DNS).
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Installed version.
    #[serde(default)]
    pub version: Option<String>,
    /// Whether the app is enabled.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub enabled: bool,
}
