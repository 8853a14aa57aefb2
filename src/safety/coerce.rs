// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coercion of untyped command-line input into capability values.
//!
//! Coercion runs in two steps. [`parse_raw_value`] first guesses a native
//! shape for the input without looking at the capability: JSON object and
//! array text become structured values, `true`/`false` become booleans and
//! plain decimal literals become numbers. [`coerce`] then dispatches on the
//! descriptor's declared [`CapabilityType`] and either returns a value ready
//! for the hub or a [`ValidationError`] naming what was expected.

use serde_json::{Number, Value};

use crate::error::ValidationError;
use crate::types::{CapabilityDescriptor, CapabilityType};

/// Guesses the native shape of a raw input.
///
/// Non-string values are returned unchanged. Strings that do not look like
/// JSON, a boolean or a decimal number are returned as given (untrimmed).
///
/// # Examples
///
/// ```
/// use homey_cli::safety::parse_raw_value;
/// use serde_json::json;
///
/// assert_eq!(parse_raw_value(&json!("0.5")), json!(0.5));
/// assert_eq!(parse_raw_value(&json!("true")), json!(true));
/// assert_eq!(parse_raw_value(&json!("{\"r\":1}")), json!({"r": 1}));
/// assert_eq!(parse_raw_value(&json!("1e3")), json!("1e3"));
/// ```
#[must_use]
pub fn parse_raw_value(raw: &Value) -> Value {
    let Value::String(text) = raw else {
        return raw.clone();
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }

    let looks_structured = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if looks_structured {
        return serde_json::from_str(trimmed).unwrap_or_else(|_| raw.clone());
    }

    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if is_decimal_literal(trimmed) {
        if let Some(number) = literal_to_number(trimmed) {
            return Value::Number(number);
        }
    }

    raw.clone()
}

/// Coerces `raw` into a value accepted by the capability.
///
/// Dispatch uses the declared type, or the runtime type of the pre-parsed
/// value when the descriptor declares none.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the expected type, range or
/// enum members when the value does not fit.
pub fn coerce(
    capability_id: &str,
    descriptor: &CapabilityDescriptor,
    raw: &Value,
) -> Result<Value, ValidationError> {
    let parsed = parse_raw_value(raw);
    let kind = descriptor.kind.unwrap_or_else(|| runtime_type(&parsed));

    tracing::debug!(capability = capability_id, kind = %kind, "coercing value");

    match kind {
        CapabilityType::Boolean => ensure_boolean(&parsed, capability_id).map(Value::Bool),
        CapabilityType::Number => {
            let number = ensure_number(&parsed, capability_id)?;
            check_range(number, descriptor, capability_id)
        }
        CapabilityType::Enum => ensure_enum(&parsed, descriptor, capability_id),
        CapabilityType::String => Ok(Value::String(stringify(&parsed))),
        CapabilityType::Color => match parsed {
            Value::Object(_) | Value::Array(_) => Ok(parsed),
            _ => Err(ValidationError::ExpectedColorObject {
                capability: capability_id.to_string(),
            }),
        },
        CapabilityType::Untyped => Ok(parsed),
    }
}

fn runtime_type(value: &Value) -> CapabilityType {
    match value {
        Value::Bool(_) => CapabilityType::Boolean,
        Value::Number(_) => CapabilityType::Number,
        Value::String(_) => CapabilityType::String,
        Value::Null | Value::Array(_) | Value::Object(_) => CapabilityType::Untyped,
    }
}

// `1`/`0` arrive as numbers after pre-parsing, so both spellings are accepted.
fn ensure_boolean(value: &Value, capability_id: &str) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) if text == "true" || text == "1" => Ok(true),
        Value::String(text) if text == "false" || text == "0" => Ok(false),
        Value::Number(number) if number.as_f64() == Some(1.0) => Ok(true),
        Value::Number(number) if number.as_f64() == Some(0.0) => Ok(false),
        _ => Err(ValidationError::ExpectedBoolean {
            capability: capability_id.to_string(),
        }),
    }
}

fn ensure_number(value: &Value, capability_id: &str) -> Result<Number, ValidationError> {
    let number = match value {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .and_then(float_to_number),
        _ => None,
    };

    number.ok_or_else(|| ValidationError::ExpectedNumber {
        capability: capability_id.to_string(),
    })
}

fn check_range(
    number: Number,
    descriptor: &CapabilityDescriptor,
    capability_id: &str,
) -> Result<Value, ValidationError> {
    let Some(actual) = number.as_f64() else {
        return Ok(Value::Number(number));
    };

    if let Some(min) = descriptor.min {
        if actual < min {
            return Err(ValidationError::BelowMinimum {
                capability: capability_id.to_string(),
                min,
                actual,
            });
        }
    }
    if let Some(max) = descriptor.max {
        if actual > max {
            return Err(ValidationError::AboveMaximum {
                capability: capability_id.to_string(),
                max,
                actual,
            });
        }
    }

    Ok(Value::Number(number))
}

fn ensure_enum(
    value: &Value,
    descriptor: &CapabilityDescriptor,
    capability_id: &str,
) -> Result<Value, ValidationError> {
    let normalized = stringify(value);

    if let Some(values) = descriptor.enum_values() {
        if !values.contains(&normalized) {
            return Err(ValidationError::NotInEnum {
                capability: capability_id.to_string(),
                options: values.ids(),
            });
        }
    }

    Ok(Value::String(normalized))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `-?\d+(\.\d+)?`
fn is_decimal_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(integer) && fraction.is_none_or(all_digits)
}

fn literal_to_number(literal: &str) -> Option<Number> {
    if !literal.contains('.') {
        if let Ok(integer) = literal.parse::<i64>() {
            return Some(Number::from(integer));
        }
    }
    literal.parse::<f64>().ok().and_then(Number::from_f64)
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn float_to_number(value: f64) -> Option<Number> {
    const SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < SAFE_INTEGER {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}
