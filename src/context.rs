// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Choosing the hub a command runs against.
//!
//! The selection order is:
//!
//! 1. an explicit `--homey <id>`;
//! 2. the only hub, when the account owns exactly one (a stale persisted
//!    selection is ignored in that case);
//! 3. the persisted selection from `homey use`.
//!
//! Whatever is picked must be one of the account's hubs. Failures carry the
//! full hub list so the user can be shown the choices.

use crate::config::ConfigStore;
use crate::error::{AmbiguityError, Result};
use crate::protocol::AccountApi;
use crate::types::{HubSummary, User};

/// Picks exactly one hub or explains why it cannot.
///
/// Empty selections count as absent.
///
/// # Errors
///
/// Returns [`AmbiguityError::NoHubs`] when `hubs` is empty,
/// [`AmbiguityError::HubRequired`] when nothing selects a hub, and
/// [`AmbiguityError::HubNotFound`] when the selection is not one of `hubs`.
///
/// # Examples
///
/// ```
/// use homey_cli::context::resolve_hub;
/// use homey_cli::types::HubSummary;
///
/// let hubs = vec![HubSummary::new("a1", "Home"), HubSummary::new("b2", "Cabin")];
///
/// assert_eq!(resolve_hub(Some("b2"), None, &hubs).unwrap().name, "Cabin");
/// assert_eq!(resolve_hub(None, Some("a1"), &hubs).unwrap().name, "Home");
/// assert!(resolve_hub(None, None, &hubs).is_err());
/// ```
pub fn resolve_hub<'a>(
    explicit: Option<&str>,
    persisted: Option<&str>,
    hubs: &'a [HubSummary],
) -> std::result::Result<&'a HubSummary, AmbiguityError> {
    let explicit = explicit.filter(|id| !id.is_empty());
    let persisted = persisted.filter(|id| !id.is_empty());
    if hubs.is_empty() {
        return Err(AmbiguityError::NoHubs);
    }

    let requested = match (explicit, hubs) {
        (Some(id), _) => id,
        (None, [only]) => {
            tracing::debug!(hub = %only.id, "using the only hub on the account");
            return Ok(only);
        }
        (None, _) => persisted.ok_or_else(|| AmbiguityError::HubRequired {
            hubs: hubs.to_vec(),
        })?,
    };

    hubs.iter()
        .find(|hub| hub.id == requested)
        .ok_or_else(|| AmbiguityError::HubNotFound {
            requested: requested.to_string(),
            hubs: hubs.to_vec(),
        })
}

/// A connected hub together with the account and summary it was resolved from.
#[derive(Debug)]
pub struct HubContext<H> {
    /// The authenticated account.
    pub user: User,
    /// The selected hub.
    pub hub: HubSummary,
    /// Live access to the selected hub.
    pub api: H,
}

impl<H> HubContext<H> {
    /// Resolves the target hub and opens a session on it.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the account cannot be read or the hub
    /// refuses the session, a config error if the persisted selection cannot
    /// be read, or an ambiguity error from [`resolve_hub`].
    pub async fn connect<A>(
        account: &A,
        store: &impl ConfigStore,
        explicit: Option<&str>,
    ) -> Result<Self>
    where
        A: AccountApi<Hub = H>,
    {
        let user = account.user().await?;
        let persisted = store.active_hub_id()?;
        let hub = resolve_hub(explicit, persisted.as_deref(), &user.homeys)?.clone();

        tracing::debug!(hub = %hub.id, name = %hub.name, "connecting to hub");
        let api = account.connect(&hub).await?;

        Ok(Self { user, hub, api })
    }
}
