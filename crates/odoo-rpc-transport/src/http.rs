//! `reqwest` implementation of the transport collaborator.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use odoo_rpc_core::{Transport, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// Longest body excerpt kept in a [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// User agent string.
    pub user_agent: String,
    /// Additional headers sent with every request.
    pub headers: HashMap<String, String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("odoo-rpc/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
        }
    }
}

impl HttpTransportConfig {
    /// Set timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set additional header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Posts JSON envelopes over HTTP(S).
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with default settings.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(&HttpTransportConfig::default())
    }

    /// Create a transport from explicit settings.
    ///
    /// # Errors
    /// Returns error if a header is invalid or the HTTP client cannot be built.
    pub fn with_config(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| TransportError::Client(format!("invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Client(format!("invalid value for '{key}': {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    TransportError::Request {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(json) => {
                if !status.is_success() {
                    tracing::warn!("HTTP {} from '{}' with a JSON body", status, url);
                }
                Ok(json)
            }
            Err(e) if status.is_success() => Err(TransportError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&bytes), MAX_ERROR_BODY),
            }),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
