// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Allowlist of capabilities that may be written.
//!
//! Only capabilities on this list are ever written, whatever the device
//! reports. The built-in list covers common lighting, climate, media and
//! cover controls. It can be replaced (not extended) by a comma-separated
//! override, usually taken from `HOMEY_CLI_ALLOWED_CAPABILITIES`.

use std::collections::BTreeSet;

use crate::error::PolicyError;

/// Capabilities writable by default.
pub const DEFAULT_ALLOWED: [&str; 15] = [
    "onoff",
    "dim",
    "light_hue",
    "light_saturation",
    "light_temperature",
    "light_mode",
    "target_temperature",
    "thermostat_mode",
    "volume_set",
    "speaker_playing",
    "windowcoverings_set",
    "fan_speed",
    "fan_mode",
    "alarm_arm",
    "vacuumcleaner_state",
];

/// The set of capability ids permitted for writes.
///
/// Immutable once built; construct it once per invocation and pass it to
/// the [`CapabilityWriter`](crate::write::CapabilityWriter).
///
/// # Examples
///
/// ```
/// use homey_cli::safety::AllowedCapabilities;
///
/// let defaults = AllowedCapabilities::default();
/// assert!(defaults.contains("onoff"));
///
/// let custom = AllowedCapabilities::from_override(Some(" onoff , dim,,"));
/// assert_eq!(custom.len(), 2);
/// assert!(!custom.contains("light_hue"));
///
/// // An override with no usable entries keeps the defaults.
/// let fallback = AllowedCapabilities::from_override(Some(" , "));
/// assert_eq!(fallback, AllowedCapabilities::default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedCapabilities {
    ids: BTreeSet<String>,
    overridden: bool,
}

impl Default for AllowedCapabilities {
    fn default() -> Self {
        Self {
            ids: DEFAULT_ALLOWED.iter().map(|id| (*id).to_string()).collect(),
            overridden: false,
        }
    }
}

impl AllowedCapabilities {
    /// Builds the allowlist from an optional comma-separated override.
    ///
    /// Entries are trimmed and empty entries dropped. When nothing usable is
    /// left (or there is no override) the built-in defaults apply; an empty
    /// override never means "allow everything".
    #[must_use]
    pub fn from_override(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let ids: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        if ids.is_empty() {
            tracing::warn!("capability allowlist override is empty, using defaults");
            return Self::default();
        }

        tracing::debug!(count = ids.len(), "using capability allowlist override");
        Self {
            ids,
            overridden: true,
        }
    }

    /// Returns whether `capability_id` may be written.
    #[must_use]
    pub fn contains(&self, capability_id: &str) -> bool {
        self.ids.contains(capability_id)
    }

    /// Checks that `capability_id` may be written.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NotAllowed`] when it is not on the list.
    pub fn ensure_allowed(&self, capability_id: &str) -> Result<(), PolicyError> {
        if self.contains(capability_id) {
            Ok(())
        } else {
            Err(PolicyError::NotAllowed {
                capability: capability_id.to_string(),
            })
        }
    }

    /// Returns whether an override replaced the defaults.
    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Returns the number of allowed capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether the list is empty. Never true for a built list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates over the allowed ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
