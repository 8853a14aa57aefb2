// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `apps list`.

use serde_json::{Value, json};

use super::Report;
use crate::context::HubContext;
use crate::error::Result;
use crate::protocol::HubApi;

/// Lists installed apps.
///
/// # Errors
///
/// Returns the hub's error if apps cannot be fetched.
pub async fn list<H: HubApi>(ctx: &HubContext<H>) -> Result<Report> {
    let apps: Vec<Value> = ctx
        .api
        .apps()
        .await?
        .into_values()
        .map(|app| json!(app))
        .collect();

    Ok(Report::table(
        json!({ "apps": apps }),
        &apps,
        &["id", "name", "version", "enabled"],
        "No apps found.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{context, hub};

    #[tokio::test]
    async fn lists_apps() {
        let report = list(&context(hub())).await.unwrap();
        assert_eq!(
            report.data,
            json!({"apps": [{"id": "com.example", "name": "Example", "version": "1.2.3", "enabled": true}]})
        );
        assert_eq!(
            report.human,
            "id           name     version  enabled\n\
             -----------  -------  -------  -------\n\
             com.example  Example  1.2.3    true   "
        );
    }
}
