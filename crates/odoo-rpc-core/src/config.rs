//! Connection configuration and envelope defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON-RPC protocol version sent when the caller does not override it.
pub const DEFAULT_JSONRPC_VERSION: &str = "2.0";

/// Environment variables read by [`ConnectionConfig::from_env`].
pub const ENV_URL: &str = "ODOO_URL";
pub const ENV_DATABASE: &str = "ODOO_DATABASE";
pub const ENV_USERNAME: &str = "ODOO_USERNAME";
pub const ENV_PASSWORD: &str = "ODOO_PASSWORD";

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
}

/// Where and as whom to connect.
///
/// Immutable once handed to a session manager; reconfiguring replaces it wholesale.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the server, e.g. `https://erp.example.com`.
    pub url: String,
    /// Database name.
    pub database: String,
    /// Login.
    pub username: String,
    /// Password or API key. Sent with every data call.
    pub password: String,
}

impl ConnectionConfig {
    /// Create a new connection configuration.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read the configuration from `ODOO_URL`, `ODOO_DATABASE`, `ODOO_USERNAME`
    /// and `ODOO_PASSWORD`.
    ///
    /// # Errors
    /// Returns error if any of the variables is unset or not valid unicode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from the same variables as
    /// [`from_env`](Self::from_env), resolved through `get`.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingVar`] naming the first variable `get` cannot resolve.
    pub fn from_lookup(get: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str| get(name).ok_or(ConfigError::MissingVar(name));
        Ok(Self {
            url: var(ENV_URL)?,
            database: var(ENV_DATABASE)?,
            username: var(ENV_USERNAME)?,
            password: var(ENV_PASSWORD)?,
        })
    }

    /// Endpoint for `common` and `object` service calls.
    #[must_use]
    pub fn jsonrpc_endpoint(&self) -> String {
        format!("{}/jsonrpc", self.base_url())
    }

    /// Endpoint for the unauthenticated database listing.
    #[must_use]
    pub fn database_list_endpoint(&self) -> String {
        format!("{}/web/database/list", self.base_url())
    }

    fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Root fields merged into every outgoing envelope.
///
/// Starts as `{"jsonrpc": "2.0"}`; caller-supplied fields take precedence.
/// The envelope's own `method`, `params` and `id` are always written last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeDefaults {
    fields: Map<String, Value>,
}

impl Default for EnvelopeDefaults {
    fn default() -> Self {
        let mut fields = Map::new();
        fields.insert(
            "jsonrpc".to_string(),
            Value::String(DEFAULT_JSONRPC_VERSION.to_string()),
        );
        Self { fields }
    }
}

impl EnvelopeDefaults {
    /// Library defaults overlaid with the caller's root fields.
    #[must_use]
    pub fn with_overrides(root: Map<String, Value>) -> Self {
        let mut defaults = Self::default();
        defaults.fields.extend(root);
        defaults
    }

    /// Override the protocol version.
    #[must_use]
    pub fn with_jsonrpc(self, version: impl Into<String>) -> Self {
        self.with_field("jsonrpc", Value::String(version.into()))
    }

    /// Set an additional root field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// The `jsonrpc` version that will be sent, if any.
    #[must_use]
    pub fn jsonrpc(&self) -> Option<&str> {
        self.fields.get("jsonrpc").and_then(Value::as_str)
    }

    /// All root fields.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}
