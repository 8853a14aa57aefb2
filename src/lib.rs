// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `homey_cli` - Safe command-line access to an Athom Homey hub.
//!
//! This library backs the `homey-cli` binary: it reads devices, zones,
//! flows and apps from a hub, and writes capability values through a
//! write-safety layer that every write passes.
//!
//! # Write safety
//!
//! A capability write is sent only if:
//!
//! - the capability id is on the allowlist ([`safety::AllowedCapabilities`]);
//! - the device marks the capability as setable;
//! - the raw input coerces to the capability's type and range
//!   ([`safety::coerce`]).
//!
//! With `dry_run` set, all of the above still runs and the coerced value is
//! reported, but the hub is never called.
//!
//! # Quick Start
//!
//! ## Writing a capability
//!
//! ```no_run
//! use homey_cli::config::{FileStore, Settings, resolve_token};
//! use homey_cli::context::HubContext;
//! use homey_cli::protocol::{CloudClient, HttpConfig};
//! use homey_cli::write::CapabilityWriter;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> homey_cli::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let store = FileStore::from_env()?;
//!     let token = resolve_token(&settings, &store)?;
//!
//!     let cloud = CloudClient::from_config(
//!         HttpConfig::new(settings.cloud_url()).with_token(token),
//!     )?;
//!     let ctx = HubContext::connect(&cloud, &store, None).await?;
//!
//!     let devices = homey_cli::protocol::HubApi::devices(&ctx.api).await?;
//!     if let Some(lamp) = devices.get("lamp-id") {
//!         let writer = CapabilityWriter::new(settings.allowed_capabilities());
//!         writer.write(&ctx.api, lamp, "dim", &json!("0.4"), false).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Offline with in-memory fakes
//!
//! ```
//! use homey_cli::protocol::MemoryHub;
//! use homey_cli::safety::AllowedCapabilities;
//! use homey_cli::types::{CapabilityDescriptor, CapabilityType, ColorSpec, Device};
//! use homey_cli::write::CapabilityWriter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> homey_cli::Result<()> {
//! let bulb = Device::new("bulb", "Bulb")
//!     .with_capability(CapabilityDescriptor::new("light_hue", CapabilityType::Number).with_range(0.0, 1.0).setable())
//!     .with_capability(CapabilityDescriptor::new("light_saturation", CapabilityType::Number).with_range(0.0, 1.0).setable());
//! let hub = MemoryHub::new().with_device(bulb.clone());
//!
//! let writer = CapabilityWriter::new(AllowedCapabilities::default());
//! let results = writer
//!     .write_color(&hub, &bulb, ColorSpec::parse("#00ff00")?, false)
//!     .await?;
//! assert_eq!(results.len(), 2);
//! assert_eq!(hub.writes().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! - `http` (default): [`protocol::HttpHubClient`] and [`protocol::CloudClient`]
//! - `cli` (default): the `homey-cli` binary

pub mod catalog;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod flows;
pub mod output;
pub mod protocol;
pub mod safety;
pub mod types;
pub mod write;
pub mod zones;

pub use error::{Error, ErrorKind, Result};
