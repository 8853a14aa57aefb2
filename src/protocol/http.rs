// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the hub's manager API.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::UpstreamError;
use crate::protocol::{HubApi, IdMap};
use crate::types::{App, Device, Flow, FlowKind, Zone};

// ============================================================================
// HttpConfig
// ============================================================================

/// Connection parameters for an HTTP API.
///
/// Used for both the hub and the cloud; each request is independent.
///
/// # Examples
///
/// ```
/// use homey_cli::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.50")
///     .with_token("session-token")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.50");
///
/// let remote = HttpConfig::new("https://abc123.connect.athom.com/");
/// assert_eq!(remote.base_url(), "https://abc123.connect.athom.com");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for `address`.
    ///
    /// A bare host gets an `http://` scheme; trailing slashes are dropped.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let address = address.trim().trim_end_matches('/');
        let base_url = if address.is_empty()
            || address.starts_with("http://")
            || address.starts_with("https://")
        {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        Self {
            base_url,
            token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the bearer token if set.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn build_http_client(&self) -> Result<Client, UpstreamError> {
        if self.base_url.is_empty() {
            return Err(UpstreamError::InvalidAddress(
                "base URL is required".to_string(),
            ));
        }
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(UpstreamError::Http)
    }

    /// Creates an [`HttpHubClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the address is empty or the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpHubClient, UpstreamError> {
        let client = self.build_http_client()?;
        Ok(HttpHubClient {
            base_url: self.base_url,
            client,
            token: self.token,
        })
    }
}

// ============================================================================
// HttpHubClient
// ============================================================================

/// HTTP client for one hub.
///
/// # Examples
///
/// ```no_run
/// use homey_cli::protocol::{HttpConfig, HubApi};
///
/// # async fn example() -> homey_cli::Result<()> {
/// let hub = HttpConfig::new("192.168.1.50").with_token("session").into_client()?;
/// for (id, device) in hub.devices().await? {
///     println!("{id}: {}", device.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpHubClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl HttpHubClient {
    /// Creates a client for `address` without a token.
    ///
    /// # Errors
    ///
    /// Returns error if the address is empty or the HTTP client cannot be created.
    pub fn new(address: impl Into<String>) -> Result<Self, UpstreamError> {
        HttpConfig::new(address).into_client()
    }

    /// Returns the base URL of the hub.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a manager API URL, percent-encoding each segment.
    fn build_url(&self, segments: &[&str]) -> String {
        let mut url = format!("{}/api/manager", self.base_url);
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn get_map<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<IdMap<T>, UpstreamError> {
        let url = self.build_url(segments);
        tracing::debug!(url = %url, "GET");
        let request = authorize(self.client.get(&url), self.token.as_deref());
        let response = send(request, &url).await?;
        decode(response, &url, BodyLog::Full).await
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<(), UpstreamError> {
        let request = authorize(request, self.token.as_deref());
        send(request, url).await.map(drop)
    }
}

impl HubApi for HttpHubClient {
    async fn zones(&self) -> Result<IdMap<Zone>, UpstreamError> {
        self.get_map(&["zones", "zone"]).await
    }

    async fn devices(&self) -> Result<IdMap<Device>, UpstreamError> {
        self.get_map(&["devices", "device"]).await
    }

    async fn apps(&self) -> Result<IdMap<App>, UpstreamError> {
        self.get_map(&["apps", "app"]).await
    }

    async fn flows(&self, kind: FlowKind) -> Result<IdMap<Flow>, UpstreamError> {
        self.get_map(&["flow", flow_collection(kind)]).await
    }

    async fn set_capability_value(
        &self,
        device_id: &str,
        capability_id: &str,
        value: &Value,
    ) -> Result<(), UpstreamError> {
        let url = self.build_url(&["devices", "device", device_id, "capability", capability_id]);
        tracing::debug!(url = %url, value = %value, "PUT capability value");
        let request = self.client.put(&url).json(&json!({ "value": value }));
        self.execute(request, &url).await
    }

    async fn trigger_flow(&self, kind: FlowKind, flow_id: &str) -> Result<(), UpstreamError> {
        let url = self.build_url(&["flow", flow_collection(kind), flow_id, "trigger"]);
        tracing::debug!(url = %url, "POST flow trigger");
        self.execute(self.client.post(&url), &url).await
    }
}

const fn flow_collection(kind: FlowKind) -> &'static str {
    match kind {
        FlowKind::Flow => "flow",
        FlowKind::Advanced => "advancedflow",
    }
}

pub(crate) fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Sends a request and maps non-success statuses.
pub(crate) async fn send(request: RequestBuilder, url: &str) -> Result<Response, UpstreamError> {
    let response = request.send().await.map_err(UpstreamError::Http)?;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(UpstreamError::Unauthorized);
    }

    if !response.status().is_success() {
        return Err(UpstreamError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response)
}

/// How a response body appears in trace logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyLog {
    Full,
    /// Token exchanges: only the length is logged.
    Redacted,
}

fn loggable_body(body: &str, log: BodyLog) -> Cow<'_, str> {
    match log {
        BodyLog::Full => Cow::Borrowed(body),
        BodyLog::Redacted => Cow::Owned(format!("<redacted, {} bytes>", body.len())),
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(
    response: Response,
    url: &str,
    log: BodyLog,
) -> Result<T, UpstreamError> {
    let body = response.text().await.map_err(UpstreamError::Http)?;
    tracing::trace!(body = %loggable_body(&body, log), "received HTTP response");
    serde_json::from_str(&body).map_err(|source| UpstreamError::Decode {
        url: url.to_string(),
        source,
    })
}
