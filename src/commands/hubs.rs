// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `homey` commands: list, select and identify hubs.

use serde_json::{Value, json};

use super::{Report, hub_json, user_json};
use crate::config::ConfigStore;
use crate::context::{HubContext, resolve_hub};
use crate::error::Result;
use crate::protocol::AccountApi;

/// Lists the hubs owned by the account.
///
/// # Errors
///
/// Returns the cloud's error if the account cannot be read.
pub async fn list<A: AccountApi>(account: &A) -> Result<Report> {
    let user = account.user().await?;
    let homeys: Vec<Value> = user.homeys.iter().map(hub_json).collect();

    Ok(Report::table(
        json!({ "homeys": homeys }),
        &homeys,
        &["id", "name", "platform", "softwareVersion"],
        "No Homeys found.",
    ))
}

/// Persists `hub_id` as the active hub after checking the account owns it.
///
/// # Errors
///
/// Returns [`AmbiguityError::HubNotFound`](crate::error::AmbiguityError::HubNotFound)
/// for a hub the account does not own, or a config error if the selection
/// cannot be saved.
pub async fn use_hub<A: AccountApi>(
    account: &A,
    store: &impl ConfigStore,
    hub_id: &str,
) -> Result<Report> {
    let user = account.user().await?;
    let hub = resolve_hub(Some(hub_id), None, &user.homeys)?;
    store.set_active_hub_id(&hub.id)?;

    Ok(Report::new(
        json!({ "activeHomeyId": hub.id, "name": hub.name }),
        format!("Active Homey set to {} ({}).", hub.name, hub.id),
    ))
}

/// Shows the account and the hub commands run against.
#[must_use]
pub fn whoami<H>(ctx: &HubContext<H>) -> Report {
    Report::new(
        json!({ "user": user_json(&ctx.user), "homey": hub_json(&ctx.hub) }),
        format!(
            "User: {}\nHomey: {} ({})",
            ctx.user.label(),
            ctx.hub.name,
            ctx.hub.id
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{context, hub};
    use crate::config::MemoryStore;
    use crate::protocol::MemoryAccount;
    use crate::types::{HubSummary, User};

    fn account() -> MemoryAccount {
        MemoryAccount::new(User {
            id: "u1".to_string(),
            homeys: vec![HubSummary::new("a", "Home"), HubSummary::new("b", "Cabin")],
            ..User::default()
        })
    }

    #[tokio::test]
    async fn lists_hubs() {
        let report = list(&account()).await.unwrap();
        assert_eq!(report.data["homeys"][1]["name"], "Cabin");
        assert!(report.human.contains("softwareVersion"));
    }

    #[tokio::test]
    async fn use_persists_known_hub() {
        let store = MemoryStore::new();
        let report = use_hub(&account(), &store, "b").await.unwrap();
        assert_eq!(report.human, "Active Homey set to Cabin (b).");
        assert_eq!(store.active_hub_id().unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn use_rejects_unknown_hub() {
        let store = MemoryStore::new();
        let err = use_hub(&account(), &store, "zzz").await.unwrap_err();
        assert_eq!(err.code(), "ERR_HOMEY_NOT_FOUND");
        assert_eq!(err.hubs().map(<[_]>::len), Some(2));
        assert_eq!(store.active_hub_id().unwrap(), None);
    }

    #[test]
    fn whoami_labels_user() {
        let report = whoami(&context(hub()));
        assert_eq!(report.human, "User: Ada\nHomey: Home (h1)");
        assert_eq!(report.data["user"]["email"], "ada@example.com");
        assert_eq!(report.data["homey"]["platform"], "local");
    }
}
