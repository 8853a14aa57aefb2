// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain-text tables and JSON field selection.

use serde_json::{Map, Value};

use crate::types::value_to_text;

/// Renders rows of JSON objects as an aligned text table.
///
/// Columns are padded to their widest cell and separated by two spaces.
/// Missing and `null` cells are blank. No rows renders an empty string.
///
/// # Examples
///
/// ```
/// use homey_cli::output::format_table;
/// use serde_json::json;
///
/// let rows = [json!({"id": "a1", "name": "Home"}), json!({"id": "b22"})];
/// assert_eq!(
///     format_table(&rows, &["id", "name"]),
///     "id   name\n---  ----\na1   Home\nb22      "
/// );
/// ```
#[must_use]
pub fn format_table(rows: &[Value], columns: &[&str]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map(value_to_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .fold(column.chars().count(), usize::max)
        })
        .collect();

    let render = |values: &mut dyn Iterator<Item = String>| {
        values
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(&mut columns.iter().map(|column| (*column).to_string())));
    lines.push(render(&mut widths.iter().map(|width| "-".repeat(*width))));
    for row in cells {
        lines.push(render(&mut row.into_iter()));
    }
    lines.join("\n")
}

/// Keeps only `fields` of an object, or of each object in an array.
///
/// Fields missing from an object are skipped. An empty field list, or a
/// scalar value, returns the input unchanged.
#[must_use]
pub fn pick_fields(value: Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return value;
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| pick_fields(item, fields))
                .collect(),
        ),
        Value::Object(mut object) => {
            let mut picked = Map::new();
            for field in fields {
                if let Some(value) = object.remove(field) {
                    picked.insert(field.clone(), value);
                }
            }
            Value::Object(picked)
        }
        scalar => scalar,
    }
}

/// Splits a `--fields a,b` argument, trimming and dropping empty entries.
#[must_use]
pub fn parse_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}
