// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability descriptors as reported by the hub.
//!
//! A capability's type is data, not a Rust type: the hub tells us whether a
//! capability is a boolean, a number, an enum, a string or a color, and the
//! coercer dispatches on [`CapabilityType`] accordingly.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a capability.
///
/// Any type string the hub reports that is not listed here deserializes as
/// [`CapabilityType::Untyped`], whose values are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityType {
    /// `true` / `false`.
    Boolean,
    /// Numeric, optionally bounded by `min` / `max`.
    Number,
    /// One of a declared set of identifiers.
    Enum,
    /// Free text.
    String,
    /// Structured color object.
    Color,
    /// Anything else.
    #[serde(other)]
    Untyped,
}

impl CapabilityType {
    /// Returns the name used by the hub for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Enum => "enum",
            Self::String => "string",
            Self::Color => "color",
            Self::Untyped => "untyped",
        }
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an enum capability's value list.
///
/// The hub usually sends `{"id": "heat", "title": "Heat"}` objects, but bare
/// identifiers are accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumOption {
    /// `{"id": ..., "title": ...}`.
    Entry {
        /// Option identifier.
        id: Value,
        /// Human-readable title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<Value>,
    },
    /// A bare identifier.
    Bare(Value),
}

impl EnumOption {
    /// Returns the option identifier as text.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Entry { id, .. } | Self::Bare(id) => value_to_text(id),
        }
    }
}

/// Allowed values of an enum capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValues {
    /// Ordered list of options.
    List(Vec<EnumOption>),
    /// Mapping whose keys are the option identifiers.
    Map(serde_json::Map<String, Value>),
}

impl EnumValues {
    /// Returns every option identifier, in declaration order for lists.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        match self {
            Self::List(options) => options.iter().map(EnumOption::id).collect(),
            Self::Map(map) => map.keys().cloned().collect(),
        }
    }

    /// Returns whether `id` is one of the declared options.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::List(options) => options.iter().any(|option| option.id() == id),
            Self::Map(map) => map.contains_key(id),
        }
    }
}

/// Extra options some drivers nest under `opts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOptions {
    /// Enum values declared under `opts.values`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<EnumValues>,
}

/// Metadata describing one capability of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    /// Capability identifier, unique per device.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub id: String,
    /// Declared type; absent for some custom capabilities.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CapabilityType>,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    /// Display unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Value>,
    /// Declared lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Declared upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Whether the capability accepts writes.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub setable: bool,
    /// Whether the capability can be read.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub getable: bool,
    /// Enum values declared at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<EnumValues>,
    /// Driver-specific options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opts: Option<CapabilityOptions>,
    /// Current value.
    #[serde(default)]
    pub value: Value,
}

impl CapabilityDescriptor {
    /// Creates a descriptor with the given id and type.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: CapabilityType) -> Self {
        Self {
            id: id.into(),
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Marks the capability as setable.
    #[must_use]
    pub fn setable(mut self) -> Self {
        self.setable = true;
        self
    }

    /// Sets the numeric bounds.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets the enum values.
    #[must_use]
    pub fn with_values(mut self, values: EnumValues) -> Self {
        self.values = Some(values);
        self
    }

    /// Sets the current value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Returns the enum values, preferring the top-level declaration over `opts.values`.
    #[must_use]
    pub fn enum_values(&self) -> Option<&EnumValues> {
        self.values
            .as_ref()
            .or_else(|| self.opts.as_ref().and_then(|opts| opts.values.as_ref()))
    }

    /// Returns the display unit as text.
    #[must_use]
    pub fn unit(&self) -> Option<String> {
        self.units.as_ref().map(value_to_text)
    }
}

/// Renders a JSON value the way it reads on a command line.
///
/// Strings are returned without quotes; `null` becomes an empty string;
/// everything else is compact JSON.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
