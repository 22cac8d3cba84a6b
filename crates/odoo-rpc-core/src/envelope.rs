//! Wire envelope for `POST /jsonrpc` and response classification.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{EnvelopeDefaults, RemoteError, RpcError, RpcResult};

/// Database id of a record.
pub type RecordId = i64;

/// Envelope-level method for every call.
pub const CALL_METHOD: &str = "call";

/// Remote service addressed inside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Session and server information (`authenticate`, `version`).
    Common,
    /// Model-level dispatch through `execute_kw`.
    Object,
}

impl Service {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Object => "object",
        }
    }
}

/// `params` of a service call, as seen on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallParams {
    pub service: Service,
    pub method: String,
    pub args: Vec<Value>,
}

/// A single outgoing request.
///
/// The id is only for correlation in logs. Each call is one strict
/// request/response round trip, so the echoed id is never checked.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcEnvelope {
    /// `None` renders as the empty `{}` params of the database listing.
    params: Option<CallParams>,
    id: Value,
}

impl RpcEnvelope {
    /// Envelope for `service.method(args)` with a fresh correlation id.
    #[must_use]
    pub fn call(service: Service, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            params: Some(CallParams {
                service,
                method: method.into(),
                args,
            }),
            id: json!(next_correlation_id()),
        }
    }

    /// Envelope for `/web/database/list`: empty params and a null id.
    #[must_use]
    pub const fn database_list() -> Self {
        Self {
            params: None,
            id: Value::Null,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &Value {
        &self.id
    }

    #[must_use]
    pub const fn params(&self) -> Option<&CallParams> {
        self.params.as_ref()
    }

    /// Render the envelope, merging `defaults` underneath the call fields.
    ///
    /// # Errors
    /// Returns [`RpcError::Encode`] if the params cannot be serialized.
    pub fn to_value(&self, defaults: &EnvelopeDefaults) -> RpcResult<Value> {
        let params = match &self.params {
            Some(params) => serde_json::to_value(params)?,
            None => Value::Object(Map::new()),
        };

        let mut body = defaults.fields().clone();
        body.insert("method".to_string(), Value::String(CALL_METHOD.to_string()));
        body.insert("params".to_string(), params);
        body.insert("id".to_string(), self.id.clone());
        Ok(Value::Object(body))
    }
}

/// Time-based correlation value (milliseconds since the Unix epoch).
#[must_use]
pub fn next_correlation_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Decoded outcome of a response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    Success(Value),
    Failure(RemoteError),
}

/// Classify a decoded response body.
///
/// A truthy `error` wins over `result`; `null`, `false`, `0` and `""` count as
/// no error. `result: null` is a valid success.
///
/// # Errors
/// Returns [`RpcError::InvalidResponse`] if the body is not an object or carries
/// neither `result` nor `error`.
pub fn decode_response(response: Value) -> RpcResult<RpcOutcome> {
    let mut body = match response {
        Value::Object(body) => body,
        other => {
            return Err(RpcError::InvalidResponse(format!(
                "expected a JSON object, got {other}"
            )));
        }
    };

    if let Some(error) = body.remove("error").filter(is_truthy) {
        let err = RemoteError::from_error_value(error);
        tracing::debug!(kind = ?err.kind, "Response carries an error: {}", err.message);
        return Ok(RpcOutcome::Failure(err));
    }

    body.remove("result").map(RpcOutcome::Success).ok_or_else(|| {
        RpcError::InvalidResponse("response has neither 'result' nor 'error'".to_string())
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
