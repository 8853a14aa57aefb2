// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human-friendly color input for lighting capabilities.
//!
//! Lights take either hue/saturation fractions or a color temperature. This
//! module turns what people type on a command line into one of the two.
//!
//! Accepted forms, tried in this order:
//!
//! 1. `#RRGGBB` or `RRGGBB`
//! 2. `temp:<n>`, `temperature:<n>` or `kelvin:<n>` (case-insensitive)
//! 3. `hsv:h,s[,v]` or `hsb:h,s[,v]`
//! 4. `h,s[,v]` without a prefix
//!
//! HSV components greater than 1 are read as degrees (hue) or percent
//! (saturation, value) and scaled down; components at or below 1 are taken
//! as already normalized. This makes `hsv:1,1,1` mean "fully on", not
//! "1°, 1%, 1%".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RgbColor;
use crate::error::ValidationError;

const TEMPERATURE_PREFIXES: [&str; 3] = ["temperature", "kelvin", "temp"];
const HSV_PREFIXES: [&str; 2] = ["hsv", "hsb"];

/// A parsed color request.
///
/// # Examples
///
/// ```
/// use homey_cli::types::ColorSpec;
///
/// let spec: ColorSpec = "hsv:180,50,75".parse().unwrap();
/// assert_eq!(
///     spec,
///     ColorSpec::Hsv { hue: 0.5, saturation: 0.5, value: Some(0.75) }
/// );
///
/// let warm: ColorSpec = "temp:2700".parse().unwrap();
/// assert_eq!(warm, ColorSpec::Temperature { value: 2700.0 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ColorSpec {
    /// Hue/saturation/value, each normalized to `[0, 1]`.
    Hsv {
        /// Hue fraction.
        hue: f64,
        /// Saturation fraction.
        saturation: f64,
        /// Value fraction; absent when only two components were given.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    /// Color temperature, passed through unnormalized.
    Temperature {
        /// Temperature as typed.
        value: f64,
    },
}

impl ColorSpec {
    /// Parses color input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTemperature`] or
    /// [`ValidationError::InvalidHsv`] when a recognized prefix carries a bad
    /// payload, and [`ValidationError::UnsupportedColor`] for anything else.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();

        if let Some(hex) = six_digit_hex(raw) {
            let hsv = RgbColor::from_hex(hex)?.to_hsv();
            return Ok(Self::Hsv {
                hue: hsv.hue,
                saturation: hsv.saturation,
                value: Some(hsv.value),
            });
        }

        if let Some(payload) = strip_prefix(raw, &TEMPERATURE_PREFIXES) {
            let value = parse_number(payload)
                .ok_or_else(|| ValidationError::InvalidTemperature(payload.to_string()))?;
            return Ok(Self::Temperature { value });
        }

        if let Some(payload) = strip_prefix(raw, &HSV_PREFIXES) {
            let parts = parse_components(payload)
                .ok_or_else(|| ValidationError::InvalidHsv(payload.to_string()))?;
            return Ok(Self::from_components(&parts));
        }

        if raw.contains(',') {
            if let Some(parts) = parse_components(raw) {
                return Ok(Self::from_components(&parts));
            }
        }

        Err(ValidationError::UnsupportedColor(raw.to_string()))
    }

    fn from_components(parts: &[f64]) -> Self {
        let scale = |component: f64, full: f64| {
            if component > 1.0 {
                component / full
            } else {
                component
            }
        };

        Self::Hsv {
            hue: scale(parts[0], 360.0),
            saturation: scale(parts[1], 100.0),
            value: parts.get(2).map(|&value| scale(value, 100.0)),
        }
    }
}

impl FromStr for ColorSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hsv {
                hue,
                saturation,
                value: Some(value),
            } => write!(f, "hsv:{hue},{saturation},{value}"),
            Self::Hsv {
                hue,
                saturation,
                value: None,
            } => write!(f, "hsv:{hue},{saturation}"),
            Self::Temperature { value } => write!(f, "temp:{value}"),
        }
    }
}

fn six_digit_hex(raw: &str) -> Option<&str> {
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    (hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())).then_some(hex)
}

/// Strips the first matching prefix (case-insensitive), an optional `:` and
/// leading whitespace. The remaining payload must be non-empty.
fn strip_prefix<'a>(raw: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        let head = raw.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        let rest = &raw[prefix.len()..];
        let rest = rest.strip_prefix(':').unwrap_or(rest).trim_start();
        (!rest.is_empty()).then_some(rest)
    })
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Parses 2 or 3 comma-separated numbers.
fn parse_components(payload: &str) -> Option<Vec<f64>> {
    let parts = payload
        .split(',')
        .map(parse_number)
        .collect::<Option<Vec<_>>>()?;
    (2..=3).contains(&parts.len()).then_some(parts)
}
