//! Scripted transport for unit tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use odoo_rpc_core::{Transport, TransportError};
use serde_json::Value;

/// A request seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub url: String,
    pub body: Value,
}

/// Replays canned replies in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, reply: Value) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Ok(reply));
        Arc::clone(self)
    }

    pub fn fail(self: &Arc<Self>, err: TransportError) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Err(err));
        Arc::clone(self)
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    /// `params.args` of the most recent request.
    pub fn last_args(&self) -> Value {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|c| c.body["params"]["args"].clone())
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Recorded {
            url: url.to_string(),
            body: body.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {url}"))
    }
}
