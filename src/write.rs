// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Guarded capability writes.
//!
//! Every write goes through the same steps, in order:
//!
//! 1. the capability must be on the [`AllowedCapabilities`] list;
//! 2. the device must expose it as setable;
//! 3. the raw input is coerced to the capability's declared type;
//! 4. on dry-run the coerced value is returned without calling the hub,
//!    otherwise it is written.
//!
//! Color writes that need hue and saturation check and coerce both values
//! before writing either. The two hub calls are still independent: if the
//! second fails the first stays applied and [`Error::PartialWrite`] says so.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::HubApi;
use crate::safety::{AllowedCapabilities, coerce};
use crate::types::{CapabilityDescriptor, ColorSpec, Device};

/// Capability written for color temperature.
pub const TEMPERATURE_CAPABILITY: &str = "light_temperature";
/// Capability written for hue.
pub const HUE_CAPABILITY: &str = "light_hue";
/// Capability written for saturation.
pub const SATURATION_CAPABILITY: &str = "light_saturation";

/// Whether a write reached the hub.
///
/// Serializes as `{"status": "ok"}` or `{"dryRun": true}`, meant to be
/// flattened into the enclosing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The hub accepted the value.
    Applied,
    /// Validated only; the hub was not called.
    DryRun,
}

impl WriteStatus {
    /// Returns the status for a run with or without `--dry-run`.
    #[must_use]
    pub const fn for_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Applied }
    }

    /// Returns whether the hub was left untouched.
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

impl Serialize for WriteStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Applied => map.serialize_entry("status", "ok")?,
            Self::DryRun => map.serialize_entry("dryRun", &true)?,
        }
        map.end()
    }
}

/// Outcome of one capability write.
///
/// Serializes as `{deviceId, capabilityId, value, status: "ok"}` when
/// applied and `{deviceId, capabilityId, value, dryRun: true}` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    /// Target device.
    pub device_id: String,
    /// Written capability.
    pub capability_id: String,
    /// The coerced value (what was, or would have been, sent).
    pub value: Value,
    /// Whether the value was sent.
    #[serde(flatten)]
    pub status: WriteStatus,
}

impl WriteResult {
    /// Returns whether this was a dry run.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.status.is_dry_run()
    }
}

/// Applies the write-safety checks and performs capability writes.
///
/// # Examples
///
/// ```
/// use homey_cli::protocol::MemoryHub;
/// use homey_cli::safety::AllowedCapabilities;
/// use homey_cli::types::{CapabilityDescriptor, CapabilityType, Device};
/// use homey_cli::write::CapabilityWriter;
/// use serde_json::json;
///
/// # async fn example() -> homey_cli::Result<()> {
/// let lamp = Device::new("lamp-1", "Desk lamp").with_capability(
///     CapabilityDescriptor::new("dim", CapabilityType::Number)
///         .with_range(0.0, 1.0)
///         .setable(),
/// );
/// let hub = MemoryHub::new().with_device(lamp.clone());
/// let writer = CapabilityWriter::new(AllowedCapabilities::default());
///
/// let result = writer.write(&hub, &lamp, "dim", &json!("0.5"), true).await?;
/// assert!(result.is_dry_run());
/// assert_eq!(result.value, json!(0.5));
/// assert!(hub.writes().is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapabilityWriter {
    allowed: AllowedCapabilities,
}

impl CapabilityWriter {
    /// Creates a writer enforcing `allowed`.
    #[must_use]
    pub fn new(allowed: AllowedCapabilities) -> Self {
        Self { allowed }
    }

    /// Returns the enforced allowlist.
    #[must_use]
    pub fn allowed(&self) -> &AllowedCapabilities {
        &self.allowed
    }

    /// Runs the policy, setability and coercion checks without writing.
    ///
    /// # Errors
    ///
    /// Returns a policy, not-found or validation error, in that order of checking.
    pub fn prepare(&self, device: &Device, capability_id: &str, raw: &Value) -> Result<Value> {
        let descriptor = self.check(device, capability_id)?;
        Ok(coerce(capability_id, descriptor, raw)?)
    }

    fn check<'a>(
        &self,
        device: &'a Device,
        capability_id: &str,
    ) -> Result<&'a CapabilityDescriptor> {
        self.allowed.ensure_allowed(capability_id)?;
        device.setable_capability(capability_id)
    }

    /// Writes one capability value, or validates it only when `dry_run` is set.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, or the hub's error for the write itself.
    pub async fn write<H: HubApi>(
        &self,
        hub: &H,
        device: &Device,
        capability_id: &str,
        raw: &Value,
        dry_run: bool,
    ) -> Result<WriteResult> {
        let value = self.prepare(device, capability_id, raw)?;
        self.send(hub, device, capability_id, value, dry_run).await
    }

    async fn send<H: HubApi>(
        &self,
        hub: &H,
        device: &Device,
        capability_id: &str,
        value: Value,
        dry_run: bool,
    ) -> Result<WriteResult> {
        let status = if dry_run {
            tracing::debug!(device = %device.id, capability = capability_id, value = %value, "dry run, skipping write");
            WriteStatus::DryRun
        } else {
            hub.set_capability_value(&device.id, capability_id, &value)
                .await?;
            tracing::debug!(device = %device.id, capability = capability_id, value = %value, "capability written");
            WriteStatus::Applied
        };

        Ok(WriteResult {
            device_id: device.id.clone(),
            capability_id: capability_id.to_string(),
            value,
            status,
        })
    }

    /// Writes a color.
    ///
    /// A temperature sets `light_temperature`. HSV sets `light_hue` and
    /// `light_saturation`; the value component is not written (brightness
    /// stays under `dim`).
    ///
    /// # Errors
    ///
    /// Returns the first failing check before anything is written. If the
    /// saturation write fails after the hue write succeeded, returns
    /// [`Error::PartialWrite`] carrying the applied hue write.
    pub async fn write_color<H: HubApi>(
        &self,
        hub: &H,
        device: &Device,
        color: ColorSpec,
        dry_run: bool,
    ) -> Result<Vec<WriteResult>> {
        match color {
            ColorSpec::Temperature { value } => {
                let result = self
                    .write(hub, device, TEMPERATURE_CAPABILITY, &Value::from(value), dry_run)
                    .await?;
                Ok(vec![result])
            }
            ColorSpec::Hsv {
                hue, saturation, ..
            } => {
                let hue_descriptor = self.check(device, HUE_CAPABILITY)?;
                let saturation_descriptor = self.check(device, SATURATION_CAPABILITY)?;
                let hue = coerce(HUE_CAPABILITY, hue_descriptor, &Value::from(hue))?;
                let saturation = coerce(
                    SATURATION_CAPABILITY,
                    saturation_descriptor,
                    &Value::from(saturation),
                )?;

                let hue_result = self
                    .send(hub, device, HUE_CAPABILITY, hue, dry_run)
                    .await?;
                match self
                    .send(hub, device, SATURATION_CAPABILITY, saturation, dry_run)
                    .await
                {
                    Ok(saturation_result) => Ok(vec![hue_result, saturation_result]),
                    Err(Error::Upstream(source)) => {
                        tracing::warn!(
                            device = %device.id,
                            error = %source,
                            "saturation write failed after hue was applied"
                        );
                        Err(Error::PartialWrite {
                            applied: vec![hue_result],
                            source,
                        })
                    }
                    Err(other) => Err(other),
                }
            }
        }
    }
}
