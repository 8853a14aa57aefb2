// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data types exchanged with the hub and the cloud.
//!
//! # Types
//!
//! - [`CapabilityDescriptor`] - Type, bounds and setability of one capability
//! - [`Device`], [`Zone`], [`App`] - Hub inventory
//! - [`Flow`], [`FlowSummary`] - Automations of either kind
//! - [`HubSummary`], [`User`] - Account data from the cloud
//! - [`ColorSpec`] - Parsed color input (HSV or temperature)
//! - [`RgbColor`] - 8-bit RGB with HSV conversion

mod capability;
mod color;
mod device;
mod flow;
mod hub;
mod rgb_color;

pub use capability::{
    CapabilityDescriptor, CapabilityOptions, CapabilityType, EnumOption, EnumValues, value_to_text,
};
pub use color::ColorSpec;
pub use device::{App, Device, Zone};
pub use flow::{Flow, FlowKind, FlowSummary};
pub use hub::{HubSummary, User};
pub use rgb_color::{Hsv, RgbColor};

use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` as the field's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
