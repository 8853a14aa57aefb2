// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud account client.
//!
//! The cloud knows who the user is and which hubs they own. Talking to a
//! hub takes two hops: the cloud issues a short-lived delegation token for
//! the `homey` audience, and the hub exchanges it for a session token.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::http::{BodyLog, authorize, decode, send};
use super::{AccountApi, HttpConfig, HttpHubClient};
use crate::error::UpstreamError;
use crate::types::{HubSummary, User};

/// Tokens come back either as a bare JSON string or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Bare(String),
    Wrapped { token: String },
}

impl TokenResponse {
    fn into_token(self) -> String {
        match self {
            Self::Bare(token) | Self::Wrapped { token } => token,
        }
    }
}

/// Client for the cloud account API.
///
/// # Examples
///
/// ```no_run
/// use homey_cli::protocol::{AccountApi, CloudClient, HttpConfig};
///
/// # async fn example() -> homey_cli::Result<()> {
/// let cloud = CloudClient::from_config(
///     HttpConfig::new(CloudClient::DEFAULT_URL).with_token("access-token"),
/// )?;
/// let user = cloud.user().await?;
/// println!("{} owns {} hubs", user.label(), user.homeys.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CloudClient {
    base_url: String,
    client: Client,
    token: Option<String>,
    timeout: Duration,
}

impl CloudClient {
    /// Public cloud API.
    pub const DEFAULT_URL: &'static str = "https://api.athom.com";

    /// Creates a client from a configuration whose token is the account's access token.
    ///
    /// # Errors
    ///
    /// Returns error if the address is empty or the HTTP client cannot be created.
    pub fn from_config(config: HttpConfig) -> Result<Self, UpstreamError> {
        let client = config.build_http_client()?;
        Ok(Self {
            base_url: config.base_url().to_string(),
            token: config.token().map(str::to_string),
            timeout: config.timeout(),
            client,
        })
    }

    /// Returns the cloud base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn delegation_token(&self) -> Result<String, UpstreamError> {
        let url = format!("{}/delegation/token?audience=homey", self.base_url);
        tracing::debug!(url = %url, "requesting delegation token");
        let request = authorize(self.client.post(&url), self.token.as_deref());
        let response = send(request, &url).await?;
        decode::<TokenResponse>(response, &url, BodyLog::Redacted)
            .await
            .map(TokenResponse::into_token)
    }

    async fn hub_session(&self, hub_url: &str, delegation: &str) -> Result<String, UpstreamError> {
        let url = format!("{hub_url}/api/manager/users/login");
        tracing::debug!(url = %url, "exchanging delegation token for a hub session");
        let request = self.client.post(&url).json(&json!({ "token": delegation }));
        let response = send(request, &url).await?;
        decode::<TokenResponse>(response, &url, BodyLog::Redacted)
            .await
            .map(TokenResponse::into_token)
    }
}

impl AccountApi for CloudClient {
    type Hub = HttpHubClient;

    async fn user(&self) -> Result<User, UpstreamError> {
        let url = format!("{}/user/me", self.base_url);
        tracing::debug!(url = %url, "GET");
        let request = authorize(self.client.get(&url), self.token.as_deref());
        let response = send(request, &url).await?;
        decode(response, &url, BodyLog::Full).await
    }

    async fn connect(&self, hub: &HubSummary) -> Result<Self::Hub, UpstreamError> {
        let config = HttpConfig::new(hub.base_url()).with_timeout(self.timeout);
        let delegation = self.delegation_token().await?;
        let session = self.hub_session(config.base_url(), &delegation).await?;
        tracing::debug!(hub = %hub.id, "hub session established");
        config.with_token(session).into_client()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_shapes() {
        let bare: TokenResponse = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(bare.into_token(), "abc");

        let wrapped: TokenResponse = serde_json::from_str(r#"{"token":"def"}"#).unwrap();
        assert_eq!(wrapped.into_token(), "def");
    }

    #[test]
    fn from_config_keeps_settings() {
        let client = CloudClient::from_config(
            HttpConfig::new("https://cloud.example/")
                .with_token("t")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://cloud.example");
        assert_eq!(client.token.as_deref(), Some("t"));
        assert_eq!(client.timeout, Duration::from_secs(2));
    }
}
