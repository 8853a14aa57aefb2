// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type with hex parsing and HSV conversion.
//!
//! Lighting capabilities take hue and saturation as fractions in `[0, 1]`,
//! so the conversion here works on normalized floats rather than degrees
//! and percentages.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Hue, saturation and value, each normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue as a fraction of a full turn, in `[0, 1)`.
    pub hue: f64,
    /// Saturation in `[0, 1]`.
    pub saturation: f64,
    /// Value (brightness) in `[0, 1]`.
    pub value: f64,
}

/// RGB color with 8-bit channels (0-255).
///
/// # Examples
///
/// ```
/// use homey_cli::types::RgbColor;
///
/// let red = RgbColor::from_hex("#FF0000").unwrap();
/// let hsv = red.to_hsv();
/// assert_eq!(hsv.hue, 0.0);
/// assert_eq!(hsv.saturation, 1.0);
/// assert_eq!(hsv.value, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses `#RRGGBB` or `RRGGBB`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHexColor`] unless the input is six
    /// hex digits.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidHexColor(hex.to_string()));
        }

        Ok(Self::new(
            parse_hex_pair(&digits[0..2])?,
            parse_hex_pair(&digits[2..4])?,
            parse_hex_pair(&digits[4..6])?,
        ))
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the color as `#RRGGBB`.
    #[must_use]
    pub fn to_hex_with_hash(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Converts this color to normalized HSV.
    ///
    /// Uses the max/min/delta formula: the hue branch is chosen by the
    /// dominant channel, saturation is `delta / max` (0 for black) and value
    /// is `max`.
    #[must_use]
    #[allow(clippy::many_single_char_names, clippy::float_cmp)]
    pub fn to_hsv(&self) -> Hsv {
        let r = f64::from(self.red) / 255.0;
        let g = f64::from(self.green) / 255.0;
        let b = f64::from(self.blue) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let mut hue = 0.0;
        if delta != 0.0 {
            hue = if max == r {
                ((g - b) / delta) % 6.0
            } else if max == g {
                (b - r) / delta + 2.0
            } else {
                (r - g) / delta + 4.0
            };
            hue /= 6.0;
            if hue < 0.0 {
                hue += 1.0;
            }
        }

        let saturation = if max == 0.0 { 0.0 } else { delta / max };

        Hsv {
            hue,
            saturation,
            value: max,
        }
    }

    /// Creates an RGB color from normalized HSV, rounding each channel.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::many_single_char_names
    )]
    pub fn from_hsv(hsv: Hsv) -> Self {
        let h = (hsv.hue.rem_euclid(1.0)) * 360.0;
        let c = hsv.value * hsv.saturation;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = hsv.value - c;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_with_hash())
    }
}

impl FromStr for RgbColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

fn parse_hex_pair(s: &str) -> Result<u8, ValidationError> {
    u8::from_str_radix(s, 16).map_err(|_| ValidationError::InvalidHexColor(s.to_string()))
}
