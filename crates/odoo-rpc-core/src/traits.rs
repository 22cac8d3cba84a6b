//! Transport seam.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::TransportError;

/// Sends one JSON body with `POST` and returns the decoded JSON reply.
///
/// Implementations must surface every network or decoding failure as a
/// [`TransportError`]. A non-2xx reply whose body still decodes as JSON should be
/// returned as-is so the caller can classify the embedded `error`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post `body` to `url`.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post_json(url, body).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post_json(url, body).await
    }
}
