// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Homey CLI.
//!
//! Every failure a command can hit falls into one of a small number of
//! categories, each with its own enum: value validation, write-safety
//! policy, unknown identifiers, ambiguous selections, upstream (hub or
//! cloud) failures and local configuration. All of them are terminal for
//! the current command; nothing is retried.

use std::fmt;

use thiserror::Error;

use crate::types::{FlowSummary, HubSummary};
use crate::write::WriteResult;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be coerced for a capability, or a color could not be parsed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A write was refused by the write-safety policy.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// An identifier did not match anything on the hub.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Several candidates matched and no disambiguator was given.
    #[error(transparent)]
    Ambiguity(#[from] AmbiguityError),

    /// The hub or cloud API call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Local settings or persisted state could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The command line was malformed.
    #[error("{0}")]
    Usage(String),

    /// A compound write failed after some of its sub-writes were applied.
    ///
    /// The applied writes are not rolled back.
    #[error("write partially applied ({} of the values were set): {source}", .applied.len())]
    PartialWrite {
        /// Sub-writes that reached the hub before the failure.
        applied: Vec<WriteResult>,
        /// The failure that stopped the remaining writes.
        source: UpstreamError,
    },
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad type, range, enum member or color syntax.
    Validation,
    /// Capability not allowlisted, not setable, or flow not triggerable.
    Policy,
    /// Unknown device, capability, flow or hub.
    NotFound,
    /// Multiple hubs or flows match.
    Ambiguity,
    /// External call failure.
    Upstream,
    /// Local configuration failure.
    Config,
    /// Malformed command line.
    Usage,
}

impl ErrorKind {
    /// Returns the category name used in JSON error payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Policy => "policy",
            Self::NotFound => "not_found",
            Self::Ambiguity => "ambiguity",
            Self::Upstream => "upstream",
            Self::Config => "config",
            Self::Usage => "usage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Policy(_) => ErrorKind::Policy,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Ambiguity(_) => ErrorKind::Ambiguity,
            Self::Upstream(_) | Self::PartialWrite { .. } => ErrorKind::Upstream,
            Self::Config(_) => ErrorKind::Config,
            Self::Usage(_) => ErrorKind::Usage,
        }
    }

    /// Returns a stable error code for scripts.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ERR_VALIDATION",
            Self::Policy(PolicyError::NotAllowed { .. }) => "ERR_CAPABILITY_NOT_ALLOWED",
            Self::Policy(PolicyError::ReadOnly { .. }) => "ERR_CAPABILITY_READ_ONLY",
            Self::Policy(PolicyError::NotTriggerable { .. }) => "ERR_FLOW_NOT_TRIGGERABLE",
            Self::NotFound(NotFoundError::Device(_)) => "ERR_DEVICE_NOT_FOUND",
            Self::NotFound(NotFoundError::Capability { .. }) => "ERR_CAPABILITY_NOT_FOUND",
            Self::NotFound(NotFoundError::Flow(_) | NotFoundError::FlowName(_)) => {
                "ERR_FLOW_NOT_FOUND"
            }
            Self::Ambiguity(AmbiguityError::NoHubs) => "ERR_NO_HOMEYS",
            Self::Ambiguity(AmbiguityError::HubRequired { .. }) => "ERR_HOMEY_REQUIRED",
            Self::Ambiguity(AmbiguityError::HubNotFound { .. }) => "ERR_HOMEY_NOT_FOUND",
            Self::Ambiguity(AmbiguityError::Flows { .. }) => "ERR_FLOW_AMBIGUOUS",
            Self::Upstream(UpstreamError::Unauthorized) => "ERR_NOT_AUTHENTICATED",
            Self::Upstream(_) => "ERR_UPSTREAM",
            Self::PartialWrite { .. } => "ERR_PARTIAL_WRITE",
            Self::Config(ConfigError::MissingToken) => "ERR_NOT_AUTHENTICATED",
            Self::Config(_) => "ERR_CONFIG",
            Self::Usage(_) => "ERR_USAGE",
        }
    }

    /// Returns the candidate hubs carried by a hub selection error.
    #[must_use]
    pub fn hubs(&self) -> Option<&[HubSummary]> {
        match self {
            Self::Ambiguity(
                AmbiguityError::HubRequired { hubs } | AmbiguityError::HubNotFound { hubs, .. },
            ) => Some(hubs.as_slice()),
            Self::Ambiguity(AmbiguityError::NoHubs) => Some(&[]),
            _ => None,
        }
    }
}

/// Errors raised while coercing a raw value for a capability or parsing a color.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The value is not a boolean.
    #[error("Capability {capability} expects a boolean.")]
    ExpectedBoolean {
        /// The capability being written.
        capability: String,
    },

    /// The value is not a number.
    #[error("Capability {capability} expects a number.")]
    ExpectedNumber {
        /// The capability being written.
        capability: String,
    },

    /// The number is below the declared minimum.
    #[error("Capability {capability} expects a value >= {min}.")]
    BelowMinimum {
        /// The capability being written.
        capability: String,
        /// Declared minimum.
        min: f64,
        /// The rejected value.
        actual: f64,
    },

    /// The number is above the declared maximum.
    #[error("Capability {capability} expects a value <= {max}.")]
    AboveMaximum {
        /// The capability being written.
        capability: String,
        /// Declared maximum.
        max: f64,
        /// The rejected value.
        actual: f64,
    },

    /// The value is not one of the declared enum members.
    #[error("Capability {capability} expects one of: {}", .options.join(", "))]
    NotInEnum {
        /// The capability being written.
        capability: String,
        /// The legal options, in declaration order.
        options: Vec<String>,
    },

    /// A color capability received a scalar.
    #[error(
        "Capability {capability} expects a color object. Use JSON like {{\"r\":255,\"g\":0,\"b\":0}}."
    )]
    ExpectedColorObject {
        /// The capability being written.
        capability: String,
    },

    /// A temperature color payload is not numeric.
    #[error("Invalid temperature value: {0}")]
    InvalidTemperature(String),

    /// An HSV color payload is not 2 or 3 numbers.
    #[error("Invalid HSV values: {0}. Use hsv:h,s,v")]
    InvalidHsv(String),

    /// The color input matches none of the accepted forms.
    #[error("Unsupported color input: {0}. Use #RRGGBB, hsv:h,s,v, or temp:<value>.")]
    UnsupportedColor(String),

    /// A hex color string is malformed.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),
}

/// Errors raised by the write-safety policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The capability is not in the allowlist.
    #[error("Capability {capability} is not in the allowlist for safe writes.")]
    NotAllowed {
        /// The refused capability.
        capability: String,
    },

    /// The capability exists but is not setable.
    #[error("Capability {capability} is read-only on device {device}.")]
    ReadOnly {
        /// The refused capability.
        capability: String,
        /// Device name (or id when unnamed).
        device: String,
    },

    /// The flow cannot be triggered manually.
    #[error("Flow {name} ({id}) is not triggerable.")]
    NotTriggerable {
        /// Flow id.
        id: String,
        /// Flow name.
        name: String,
    },
}

/// Errors raised when an identifier does not match anything.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    /// No device with this id.
    #[error("Device not found: {0}")]
    Device(String),

    /// The device has no such capability.
    #[error("Capability {capability} not found on device {device}.")]
    Capability {
        /// The requested capability.
        capability: String,
        /// Device name (or id when unnamed).
        device: String,
    },

    /// No flow or advanced flow with this id.
    #[error("Flow not found: {0}")]
    Flow(String),

    /// No flow or advanced flow with this name.
    #[error("No flows found with name: {0}")]
    FlowName(String),
}

/// Errors raised when a selection cannot be narrowed to one candidate.
///
/// Hub errors always carry every hub owned by the account so that the
/// caller can present the choices.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmbiguityError {
    /// The account owns no hubs.
    #[error("No Homeys found on this account.")]
    NoHubs,

    /// No hub was selected and the account owns several.
    #[error(
        "Multiple Homeys found. Select one with `homey-cli homey use <id>` or pass --homey <id>."
    )]
    HubRequired {
        /// All hubs owned by the account.
        hubs: Vec<HubSummary>,
    },

    /// The selected hub id is not owned by the account.
    #[error("Homey not found: {requested}")]
    HubNotFound {
        /// The explicit or persisted selection.
        requested: String,
        /// All hubs owned by the account.
        hubs: Vec<HubSummary>,
    },

    /// Several flows share the requested name.
    #[error("Multiple flows match \"{name}\": {}", format_flows(.matches))]
    Flows {
        /// The requested name.
        name: String,
        /// Every matching flow.
        matches: Vec<FlowSummary>,
    },
}

fn format_flows(flows: &[FlowSummary]) -> String {
    flows
        .iter()
        .map(|flow| format!("{} ({})", flow.name, flow.id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from the hub or cloud APIs. These are passed through, not interpreted.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token was rejected.
    #[error("Not authenticated. Run `homey-cli auth login` first.")]
    Unauthorized,

    /// The API answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body could not be decoded.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoding failure.
        source: serde_json::Error,
    },

    /// Invalid base URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Any other collaborator failure.
    #[error("{0}")]
    Other(String),
}

/// Errors related to local settings and persisted state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration directory could be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// File I/O failure.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// The I/O error.
        source: std::io::Error,
    },

    /// A persisted file holds malformed JSON.
    #[error("Failed to read JSON from {path}: {source}")]
    Json {
        /// The file involved.
        path: String,
        /// The parse error.
        source: serde_json::Error,
    },

    /// No access token is stored or provided.
    #[error("Not authenticated. Run `homey-cli auth login --token <token>` or set HOMEY_TOKEN.")]
    MissingToken,

    /// An environment setting holds an unusable value.
    #[error("invalid value for {name}: {value}")]
    InvalidSetting {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
