// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write-safety checks applied before any capability value leaves the CLI.
//!
//! - [`AllowedCapabilities`]: which capability ids may be written at all
//! - [`coerce`]: turns raw input into a value of the capability's declared type

mod allowed;
mod coerce;

pub use allowed::{AllowedCapabilities, DEFAULT_ALLOWED};
pub use coerce::{coerce, parse_raw_value};
