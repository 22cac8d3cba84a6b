//! Error model shared by every crate in the workspace.

use serde_json::Value;
use thiserror::Error;

/// Result alias used by all remote operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// An operation was attempted before the session was ready for it.
///
/// Always raised before any network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("session is not configured")]
    NotConfigured,
    #[error("session is not authenticated")]
    NotAuthenticated,
    #[error("session was reconfigured while authentication was in flight")]
    Reconfigured,
}

/// Failure of the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("HTTP request to '{url}' failed: {message}")]
    Request { url: String, message: String },
    #[error("HTTP request to '{url}' timed out")]
    Timeout { url: String },
    #[error("Server at '{url}' returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Response from '{url}' is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

/// Shape of the `error` member in a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Server-side business failure carrying `error.data.message`.
    Business,
    /// Error value without the nested `data.message` field.
    Malformed,
}

/// Error reported by the remote service inside a decoded response.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
    /// The untouched `error` value from the response.
    pub raw: Value,
}

impl RemoteError {
    /// Classify a raw `error` value. Never panics, whatever its shape.
    #[must_use]
    pub fn from_error_value(raw: Value) -> Self {
        if let Some(message) = raw.pointer("/data/message").and_then(Value::as_str) {
            return Self {
                kind: RemoteErrorKind::Business,
                message: message.to_string(),
                raw,
            };
        }

        let message = match &raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Self {
            kind: RemoteErrorKind::Malformed,
            message,
            raw,
        }
    }

    /// Whether the server reported a business-logic failure.
    #[must_use]
    pub const fn is_business(&self) -> bool {
        matches!(self.kind, RemoteErrorKind::Business)
    }
}

/// Error returned by every remote operation.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Remote error: {0}")]
    Remote(RemoteError),
    #[error("Authentication error: {0}")]
    RemoteAuth(RemoteError),
    #[error("Authentication rejected for user '{username}' on database '{database}'")]
    AuthenticationRejected { database: String, username: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Failed to encode call arguments: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RpcError {
    /// Whether the call was refused locally before touching the network.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// The remote error, for both data and authentication failures.
    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(e) | Self::RemoteAuth(e) => Some(e),
            _ => None,
        }
    }
}
