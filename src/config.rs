// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Settings and persisted state.
//!
//! [`Settings`] is read once per invocation from the environment and passed
//! down explicitly. Persisted state (the active hub and the access token)
//! lives behind the [`ConfigStore`] and [`TokenStore`] traits; [`FileStore`]
//! keeps it as JSON under the user's configuration directory.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `HOMEY_CLI_ALLOWED_CAPABILITIES` | comma-separated write allowlist | built-in list |
//! | `HOMEY_TOKEN` | cloud access token, overrides the stored one | none |
//! | `HOMEY_CLOUD_URL` | cloud API base URL | `https://api.athom.com` |
//! | `HOMEY_CLI_TIMEOUT_SECS` | HTTP timeout in seconds | 10 |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::safety::AllowedCapabilities;

/// Environment variable holding the allowlist override.
pub const ALLOWED_CAPABILITIES_VAR: &str = "HOMEY_CLI_ALLOWED_CAPABILITIES";
/// Environment variable holding an access token.
pub const TOKEN_VAR: &str = "HOMEY_TOKEN";
/// Environment variable holding the cloud API URL.
pub const CLOUD_URL_VAR: &str = "HOMEY_CLOUD_URL";
/// Environment variable holding the HTTP timeout in seconds.
pub const TIMEOUT_VAR: &str = "HOMEY_CLI_TIMEOUT_SECS";

const DEFAULT_CLOUD_URL: &str = "https://api.athom.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const APP_DIR: &str = "homey-cli";

/// Per-invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    allowed_override: Option<String>,
    token: Option<String>,
    cloud_url: String,
    timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowed_override: None,
            token: None,
            cloud_url: DEFAULT_CLOUD_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] if the timeout is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    ///
    /// Blank values count as unset, except for the allowlist override whose
    /// blank value is handled by [`AllowedCapabilities::from_override`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] if the timeout is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let timeout = match non_blank(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidSetting {
                        name: TIMEOUT_VAR,
                        value: raw,
                    });
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            allowed_override: lookup(ALLOWED_CAPABILITIES_VAR),
            token: non_blank(TOKEN_VAR).map(|token| token.trim().to_string()),
            cloud_url: non_blank(CLOUD_URL_VAR).unwrap_or_else(|| DEFAULT_CLOUD_URL.to_string()),
            timeout,
        })
    }

    /// Builds the write allowlist from the override, if any.
    #[must_use]
    pub fn allowed_capabilities(&self) -> AllowedCapabilities {
        AllowedCapabilities::from_override(self.allowed_override.as_deref())
    }

    /// Returns the token from the environment, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the cloud API base URL.
    #[must_use]
    pub fn cloud_url(&self) -> &str {
        &self.cloud_url
    }

    /// Returns the HTTP timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Storage for the active-hub selection.
pub trait ConfigStore {
    /// Returns the persisted active hub id.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store cannot be read.
    fn active_hub_id(&self) -> Result<Option<String>, ConfigError>;

    /// Persists the active hub id.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store cannot be written.
    fn set_active_hub_id(&self, hub_id: &str) -> Result<(), ConfigError>;
}

/// Storage for the cloud access token.
pub trait TokenStore {
    /// Returns the stored token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store cannot be read.
    fn token(&self) -> Result<Option<String>, ConfigError>;

    /// Stores a token, or clears it with `None`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store cannot be written.
    fn set_token(&self, token: Option<&str>) -> Result<(), ConfigError>;
}

/// Contents of `config.json`. Unknown keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active_homey_id: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Contents of `credentials.json`. Unknown keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// JSON files in a configuration directory.
///
/// # Examples
///
/// ```
/// use homey_cli::config::{ConfigStore, FileStore};
///
/// # fn example() -> Result<(), homey_cli::error::ConfigError> {
/// let dir = std::env::temp_dir().join("homey-cli-doc");
/// let store = FileStore::new(&dir);
/// store.set_active_hub_id("5f1c0ffee")?;
/// assert_eq!(store.active_hub_id()?.as_deref(), Some("5f1c0ffee"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store in `$XDG_CONFIG_HOME/homey-cli`, or the platform
    /// configuration directory when `XDG_CONFIG_HOME` is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if neither is available.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::new(base.join(APP_DIR)))
    }

    /// Returns the configuration directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of `config.json`.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.json")
    }

    /// Returns the path of `credentials.json`.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join("credentials.json")
    }

    fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => return Err(io_error(path, source)),
        };

        if contents.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;

        let contents = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents).map_err(|source| io_error(&tmp, source))?;
        fs::rename(&tmp, path).map_err(|source| io_error(path, source))?;

        tracing::debug!(path = %path.display(), "saved");
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl ConfigStore for FileStore {
    fn active_hub_id(&self) -> Result<Option<String>, ConfigError> {
        let config: ConfigFile = Self::read_json(&self.config_path())?;
        Ok(config.active_homey_id.filter(|id| !id.is_empty()))
    }

    fn set_active_hub_id(&self, hub_id: &str) -> Result<(), ConfigError> {
        let path = self.config_path();
        let mut config: ConfigFile = Self::read_json(&path)?;
        config.active_homey_id = Some(hub_id.to_string());
        self.write_json(&path, &config)?;
        tracing::info!(hub = hub_id, "active hub saved");
        Ok(())
    }
}

impl TokenStore for FileStore {
    fn token(&self) -> Result<Option<String>, ConfigError> {
        let credentials: CredentialsFile = Self::read_json(&self.credentials_path())?;
        Ok(credentials.token.filter(|token| !token.is_empty()))
    }

    fn set_token(&self, token: Option<&str>) -> Result<(), ConfigError> {
        let path = self.credentials_path();
        let mut credentials: CredentialsFile = Self::read_json(&path)?;
        credentials.token = token.map(str::to_string);
        self.write_json(&path, &credentials)?;
        tracing::info!(stored = token.is_some(), "credentials updated");
        Ok(())
    }
}

/// Non-persistent store, for tests and one-off runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    active_hub_id: Mutex<Option<String>>,
    token: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with a preselected active hub.
    #[must_use]
    pub fn with_active_hub(hub_id: impl Into<String>) -> Self {
        Self {
            active_hub_id: Mutex::new(Some(hub_id.into())),
            ..Self::default()
        }
    }
}

impl ConfigStore for MemoryStore {
    fn active_hub_id(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.active_hub_id.lock().clone())
    }

    fn set_active_hub_id(&self, hub_id: &str) -> Result<(), ConfigError> {
        *self.active_hub_id.lock() = Some(hub_id.to_string());
        Ok(())
    }
}

impl TokenStore for MemoryStore {
    fn token(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.token.lock().clone())
    }

    fn set_token(&self, token: Option<&str>) -> Result<(), ConfigError> {
        *self.token.lock() = token.map(str::to_string);
        Ok(())
    }
}

/// Returns the token to use: the environment first, then the store.
///
/// # Errors
///
/// Returns [`ConfigError::MissingToken`] when neither has one, or the
/// store's error if it cannot be read.
pub fn resolve_token(settings: &Settings, store: &impl TokenStore) -> Result<String, ConfigError> {
    if let Some(token) = settings.token() {
        return Ok(token.to_string());
    }
    store.token()?.ok_or(ConfigError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn settings_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cloud_url(), "https://api.athom.com");
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.allowed_capabilities(), AllowedCapabilities::default());
    }

    #[test]
    fn settings_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (ALLOWED_CAPABILITIES_VAR, "onoff,dim"),
            (TOKEN_VAR, " abc "),
            (CLOUD_URL_VAR, "http://localhost:9999"),
            (TIMEOUT_VAR, "3"),
        ]))
        .unwrap();

        assert_eq!(settings.allowed_capabilities().len(), 2);
        assert_eq!(settings.token(), Some("abc"));
        assert_eq!(settings.cloud_url(), "http://localhost:9999");
        assert_eq!(settings.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn blank_allowlist_override_keeps_defaults() {
        let settings = Settings::from_lookup(lookup(&[(ALLOWED_CAPABILITIES_VAR, " , ")])).unwrap();
        assert_eq!(settings.allowed_capabilities(), AllowedCapabilities::default());
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        for raw in ["0", "soon", "-1"] {
            let err = Settings::from_lookup(lookup(&[(TIMEOUT_VAR, raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidSetting { name, .. } if name == TIMEOUT_VAR));
        }
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("homey-cli"));

        assert_eq!(store.active_hub_id().unwrap(), None);
        assert_eq!(store.token().unwrap(), None);

        store.set_active_hub_id("hub-1").unwrap();
        store.set_token(Some("secret")).unwrap();
        assert_eq!(store.active_hub_id().unwrap().as_deref(), Some("hub-1"));
        assert_eq!(store.token().unwrap().as_deref(), Some("secret"));

        store.set_token(None).unwrap();
        assert_eq!(store.token().unwrap(), None);
        assert!(!store.config_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_writes_camel_case_and_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(store.config_path(), r#"{"theme":"dark"}"#).unwrap();

        store.set_active_hub_id("hub-2").unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.config_path()).unwrap()).unwrap();
        assert_eq!(
            saved,
            serde_json::json!({"activeHomeyId": "hub-2", "theme": "dark"})
        );
    }

    #[test]
    fn blank_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(store.config_path(), "  \n").unwrap();
        assert_eq!(store.active_hub_id().unwrap(), None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(store.credentials_path(), "{not json").unwrap();
        assert!(matches!(store.token(), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn env_token_wins_over_store() {
        let store = MemoryStore::new();
        store.set_token(Some("stored")).unwrap();

        let settings = Settings::from_lookup(lookup(&[(TOKEN_VAR, "env")])).unwrap();
        assert_eq!(resolve_token(&settings, &store).unwrap(), "env");
        assert_eq!(
            resolve_token(&Settings::default(), &store).unwrap(),
            "stored"
        );
    }

    #[test]
    fn missing_token_is_reported() {
        assert!(matches!(
            resolve_token(&Settings::default(), &MemoryStore::new()),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn memory_store_keeps_selection() {
        let store = MemoryStore::with_active_hub("a");
        assert_eq!(store.active_hub_id().unwrap().as_deref(), Some("a"));
        store.set_active_hub_id("b").unwrap();
        assert_eq!(store.active_hub_id().unwrap().as_deref(), Some("b"));
    }
}
