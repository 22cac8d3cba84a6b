//! Uniform `execute_kw` gateway for model-level operations.

use std::{fmt, sync::Arc};

use odoo_rpc_core::{
    ConnectionConfig, EnvelopeDefaults, RecordId, RpcEnvelope, RpcError, RpcOutcome, RpcResult,
    Service, SessionIdentity, Transport, decode_response,
};
use serde::Serialize;
use serde_json::{Value, json};

/// Generic entry point for model methods on the `object` service.
pub const EXECUTE_KW: &str = "execute_kw";

/// Issues calls on behalf of one authenticated identity.
///
/// A gateway always carries an identity, so every call it makes is
/// authenticated. Obtain one from [`crate::SessionManager::gateway`] or build it
/// directly to drive several independent sessions.
pub struct RpcGateway<T: ?Sized> {
    transport: Arc<T>,
    defaults: Arc<EnvelopeDefaults>,
    config: Arc<ConnectionConfig>,
    identity: SessionIdentity,
}

impl<T: ?Sized> Clone for RpcGateway<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            defaults: Arc::clone(&self.defaults),
            config: Arc::clone(&self.config),
            identity: self.identity,
        }
    }
}

impl<T: ?Sized> fmt::Debug for RpcGateway<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcGateway")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl<T: Transport + ?Sized> RpcGateway<T> {
    /// Create a gateway bound to `config` and `identity`.
    #[must_use]
    pub const fn new(
        transport: Arc<T>,
        defaults: Arc<EnvelopeDefaults>,
        config: Arc<ConnectionConfig>,
        identity: SessionIdentity,
    ) -> Self {
        Self {
            transport,
            defaults,
            config,
            identity,
        }
    }

    #[must_use]
    pub const fn identity(&self) -> SessionIdentity {
        self.identity
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Call `service.method(args)` and return the server's `result` untouched.
    ///
    /// # Errors
    /// Returns [`RpcError::Transport`] if the request fails and
    /// [`RpcError::Remote`] if the response carries an `error`.
    pub async fn invoke(
        &self,
        service: Service,
        method: &str,
        args: Vec<Value>,
    ) -> RpcResult<Value> {
        let envelope = RpcEnvelope::call(service, method, args);
        let url = self.config.jsonrpc_endpoint();

        tracing::debug!(
            service = service.as_str(),
            method,
            id = %envelope.id(),
            uid = self.identity.user_id,
            "Dispatching RPC call"
        );

        let response = self
            .transport
            .post_json(&url, &envelope.to_value(&self.defaults)?)
            .await?;

        match decode_response(response)? {
            RpcOutcome::Success(result) => Ok(result),
            RpcOutcome::Failure(err) => {
                tracing::warn!(
                    "RPC call {}.{} failed ({:?}): {}",
                    service.as_str(),
                    method,
                    err.kind,
                    err.message
                );
                Err(RpcError::Remote(err))
            }
        }
    }

    /// Run `model.operation(*operation_args)` through `execute_kw`.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn execute_kw(
        &self,
        model: &str,
        operation: &str,
        operation_args: Value,
    ) -> RpcResult<Value> {
        self.raw(vec![json!(model), json!(operation), operation_args]).await
    }

    /// Escape hatch: `args_tail` is appended unmodified after the credentials.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn raw(&self, args_tail: Vec<Value>) -> RpcResult<Value> {
        let mut args = self.credentials();
        args.extend(args_tail);
        self.invoke(Service::Object, EXECUTE_KW, args).await
    }

    /// `[database, uid, password]`, the prefix of every `execute_kw` call.
    fn credentials(&self) -> Vec<Value> {
        vec![
            json!(self.config.database),
            json!(self.identity.user_id),
            json!(self.config.password),
        ]
    }

    /// Technical and display names of every installed model.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn list_models(&self) -> RpcResult<Value> {
        self.execute_kw("ir.model", "search_read", json!([[], ["model", "name"]])).await
    }

    /// Field definitions of `model`.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn list_model_attributes(&self, model: &str) -> RpcResult<Value> {
        self.execute_kw(model, "fields_get", json!([[], {}])).await
    }

    /// Read `attributes` of every record matching `filters` (all records when `None`).
    ///
    /// Filters are copied into the request; attributes are only borrowed.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn find(
        &self,
        model: &str,
        attributes: &[&str],
        filters: Option<&[Value]>,
    ) -> RpcResult<Value> {
        let filters = filters.map(<[Value]>::to_vec).unwrap_or_default();
        self.execute_kw(model, "search_read", json!([filters, attributes])).await
    }

    /// Create one record; the server answers with its id.
    ///
    /// # Errors
    /// Returns [`RpcError::Encode`] if `data` cannot be serialized, otherwise see
    /// [`Self::invoke`].
    pub async fn create<D: Serialize + ?Sized>(&self, model: &str, data: &D) -> RpcResult<Value> {
        let data = serde_json::to_value(data)?;
        self.execute_kw(model, "create", json!([data])).await
    }

    /// Write `data` to a single record.
    ///
    /// # Errors
    /// Returns [`RpcError::Encode`] if `data` cannot be serialized, otherwise see
    /// [`Self::invoke`].
    pub async fn update<D: Serialize + ?Sized>(
        &self,
        model: &str,
        id: RecordId,
        data: &D,
    ) -> RpcResult<Value> {
        self.bulk_update(model, &[id], data).await
    }

    /// Write the same `data` to every record in `ids`.
    ///
    /// # Errors
    /// Returns [`RpcError::Encode`] if `data` cannot be serialized, otherwise see
    /// [`Self::invoke`].
    pub async fn bulk_update<D: Serialize + ?Sized>(
        &self,
        model: &str,
        ids: &[RecordId],
        data: &D,
    ) -> RpcResult<Value> {
        let data = serde_json::to_value(data)?;
        self.execute_kw(model, "write", json!([ids, data])).await
    }

    /// Delete a single record.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn delete(&self, model: &str, id: RecordId) -> RpcResult<Value> {
        self.bulk_delete(model, &[id]).await
    }

    /// Delete every record in `ids`.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn bulk_delete(&self, model: &str, ids: &[RecordId]) -> RpcResult<Value> {
        self.execute_kw(model, "unlink", json!([ids])).await
    }

    /// Ids of the records matching `filters`.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn search(&self, model: &str, filters: &[Value]) -> RpcResult<Value> {
        self.execute_kw(model, "search", json!([filters])).await
    }

    /// Read `attributes` of the given records.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn read(
        &self,
        model: &str,
        ids: &[RecordId],
        attributes: &[&str],
    ) -> RpcResult<Value> {
        self.execute_kw(model, "read", json!([ids, attributes])).await
    }

    /// Number of records matching `filters`.
    ///
    /// # Errors
    /// See [`Self::invoke`].
    pub async fn search_count(&self, model: &str, filters: &[Value]) -> RpcResult<Value> {
        self.execute_kw(model, "search_count", json!([filters])).await
    }
}
