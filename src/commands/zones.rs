// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `zones list`.

use serde_json::json;

use super::Report;
use crate::context::HubContext;
use crate::error::Result;
use crate::protocol::HubApi;
use crate::types::Zone;
use crate::zones::render_zone_tree;

/// Lists zones; the human form is the indented zone tree.
///
/// # Errors
///
/// Returns the hub's error if zones cannot be fetched.
pub async fn list<H: HubApi>(ctx: &HubContext<H>) -> Result<Report> {
    let zones: Vec<Zone> = ctx.api.zones().await?.into_values().collect();

    let human = if zones.is_empty() {
        "No zones found.".to_string()
    } else {
        render_zone_tree(&zones)
    };
    Ok(Report::new(json!({ "zones": zones }), human))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{context, hub};
    use crate::protocol::MemoryHub;

    #[tokio::test]
    async fn renders_tree() {
        let report = list(&context(hub())).await.unwrap();
        assert_eq!(report.human, "- Home (home)\n  - Office (office)");
        assert_eq!(report.data["zones"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn no_zones() {
        let report = list(&context(MemoryHub::new())).await.unwrap();
        assert_eq!(report.human, "No zones found.");
    }
}
