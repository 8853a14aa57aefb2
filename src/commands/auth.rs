// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `auth` commands.
//!
//! Only bearer tokens are supported; obtaining one is left to the user.

use serde_json::{Value, json};

use super::{Report, hub_json, user_json};
use crate::config::TokenStore;
use crate::error::{Error, Result, UpstreamError};
use crate::protocol::AccountApi;

/// Checks `token` against the account and stores it.
///
/// `account` must already be built with `token`. Nothing is stored when
/// the cloud rejects it.
///
/// # Errors
///
/// Returns a usage error for a blank token, the cloud's error if the
/// token is refused, or a config error if it cannot be stored.
pub async fn login<A: AccountApi>(
    account: &A,
    store: &impl TokenStore,
    token: &str,
) -> Result<Report> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::Usage(
            "Missing token. Usage: homey-cli auth login --token <token>".to_string(),
        ));
    }

    let user = account.user().await?;
    store.set_token(Some(token))?;

    let homeys: Vec<Value> = user.homeys.iter().map(hub_json).collect();
    let mut lines = vec![
        format!("Authenticated as {}.", user.label()),
        format!("Homeys: {}", user.homeys.len()),
    ];
    lines.extend(
        user.homeys
            .iter()
            .map(|hub| format!("- {} ({})", hub.name, hub.id)),
    );

    Ok(Report::new(
        json!({ "status": "ok", "user": user_json(&user), "homeys": homeys }),
        lines.join("\n"),
    ))
}

fn not_authenticated() -> Report {
    Report::new(
        json!({ "authenticated": false }),
        "Not authenticated. Run `homey-cli auth login`.",
    )
}

/// Reports whether a usable token is available.
///
/// `account` is `None` when no token is configured. A token the cloud
/// rejects also reads as not authenticated.
///
/// # Errors
///
/// Returns the cloud's error for failures other than a rejected token.
pub async fn status<A: AccountApi>(account: Option<&A>) -> Result<Report> {
    let Some(account) = account else {
        return Ok(not_authenticated());
    };

    match account.user().await {
        Ok(user) => Ok(Report::new(
            json!({ "authenticated": true, "user": user_json(&user) }),
            format!("Authenticated as {}.", user.label()),
        )),
        Err(UpstreamError::Unauthorized) => {
            tracing::debug!("stored token was rejected");
            Ok(not_authenticated())
        }
        Err(err) => Err(err.into()),
    }
}

/// Clears the stored token.
///
/// # Errors
///
/// Returns a config error if the store cannot be written.
pub fn logout(store: &impl TokenStore) -> Result<Report> {
    store.set_token(None)?;
    Ok(Report::new(json!({ "status": "ok" }), "Logged out."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;
    use crate::protocol::MemoryAccount;
    use crate::types::{HubSummary, User};

    fn account() -> MemoryAccount {
        MemoryAccount::new(User {
            id: "u1".to_string(),
            email: Some("ada@example.com".to_string()),
            homeys: vec![HubSummary::new("h1", "Home")],
            ..User::default()
        })
    }

    #[tokio::test]
    async fn login_stores_token() {
        let store = MemoryStore::new();
        let report = login(&account(), &store, " secret ").await.unwrap();
        assert_eq!(
            report.human,
            "Authenticated as ada@example.com.\nHomeys: 1\n- Home (h1)"
        );
        assert_eq!(store.token().unwrap().as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn blank_token_is_usage_error() {
        let store = MemoryStore::new();
        let err = login(&account(), &store, "  ").await.unwrap_err();
        assert_eq!(err.code(), "ERR_USAGE");
        assert_eq!(store.token().unwrap(), None);
    }

    #[tokio::test]
    async fn status_without_account() {
        let report = status::<MemoryAccount>(None).await.unwrap();
        assert_eq!(report.data, json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn status_with_account() {
        let report = status(Some(&account())).await.unwrap();
        assert_eq!(report.data["authenticated"], true);
        assert_eq!(report.human, "Authenticated as ada@example.com.");
    }

    #[test]
    fn logout_clears_token() {
        let store = MemoryStore::new();
        store.set_token(Some("secret")).unwrap();
        let report = logout(&store).unwrap();
        assert_eq!(report.human, "Logged out.");
        assert_eq!(store.token().unwrap(), None);
    }
}
