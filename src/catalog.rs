// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub-wide capability catalog.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{CapabilityType, Device};

/// One capability id as seen across all devices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Capability identifier.
    pub id: String,
    /// Type reported by the first device seen with it.
    #[serde(rename = "type")]
    pub kind: Option<CapabilityType>,
    /// Unit reported by the first device seen with it.
    pub unit: Option<String>,
    /// First declared minimum.
    pub min: Option<f64>,
    /// First declared maximum.
    pub max: Option<f64>,
    /// Whether any device accepts writes to it.
    pub setable: bool,
    /// Number of devices exposing it.
    pub device_count: usize,
}

/// Merges the capability descriptors of all `devices`, sorted by id.
#[must_use]
pub fn build_catalog<'a>(devices: impl IntoIterator<Item = &'a Device>) -> Vec<CatalogEntry> {
    let mut catalog: BTreeMap<&str, CatalogEntry> = BTreeMap::new();

    for device in devices {
        for (id, descriptor) in &device.capabilities_obj {
            let entry = catalog.entry(id).or_insert_with(|| CatalogEntry {
                id: id.clone(),
                kind: descriptor.kind,
                unit: descriptor.unit(),
                min: None,
                max: None,
                setable: false,
                device_count: 0,
            });
            entry.device_count += 1;
            entry.setable |= descriptor.setable;
            entry.min = entry.min.or(descriptor.min);
            entry.max = entry.max.or(descriptor.max);
        }
    }

    catalog.into_values().collect()
}
