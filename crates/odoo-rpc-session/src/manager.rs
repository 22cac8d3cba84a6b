//! Session manager: connection configuration and authentication.

use std::sync::Arc;

use odoo_rpc_core::{
    ConnectionConfig, EnvelopeDefaults, PreconditionError, RpcEnvelope, RpcError, RpcOutcome,
    RpcResult, Service, SessionIdentity, Transport, decode_response,
};
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::RpcGateway;

/// Mutable part of the session.
#[derive(Default)]
struct SessionState {
    config: Option<Arc<ConnectionConfig>>,
    identity: Option<SessionIdentity>,
    /// Bumped by every `configure` so in-flight authentications can detect it.
    generation: u64,
}

/// Holds one session's configuration and authenticated identity.
///
/// The state lock is never held across a network call. Callers must let
/// [`authenticate`](Self::authenticate) finish before taking gateways for
/// concurrent data operations.
pub struct SessionManager<T: Transport + ?Sized> {
    transport: Arc<T>,
    defaults: Arc<EnvelopeDefaults>,
    state: RwLock<SessionState>,
}

impl<T: Transport + ?Sized> SessionManager<T> {
    /// Create an unconfigured session manager with the default envelope fields.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_defaults(transport, EnvelopeDefaults::default())
    }

    /// Create an unconfigured session manager with custom envelope fields.
    #[must_use]
    pub fn with_defaults(transport: Arc<T>, defaults: EnvelopeDefaults) -> Self {
        Self {
            transport,
            defaults: Arc::new(defaults),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Store the connection configuration.
    ///
    /// Does not authenticate. Replacing an existing configuration also drops
    /// the identity obtained with it.
    pub async fn configure(&self, config: ConnectionConfig) {
        let mut state = self.state.write().await;
        if state.identity.take().is_some() {
            tracing::info!(
                "Reconfiguring authenticated session, identity for '{}' dropped",
                config.url
            );
        }
        state.config = Some(Arc::new(config));
        state.generation = state.generation.wrapping_add(1);
    }

    /// Configure and authenticate in one step.
    ///
    /// # Errors
    /// See [`Self::authenticate`].
    pub async fn connect(&self, config: ConnectionConfig) -> RpcResult<SessionIdentity> {
        self.configure(config).await;
        self.authenticate().await
    }

    /// Exchange the configured credentials for a session identity.
    ///
    /// Retrying re-sends the credentials and replaces the stored identity.
    ///
    /// # Errors
    /// - [`PreconditionError::NotConfigured`] before `configure`
    /// - [`RpcError::RemoteAuth`] if the server reports an error
    /// - [`RpcError::AuthenticationRejected`] if the credentials are refused
    /// - [`PreconditionError::Reconfigured`] if `configure` ran meanwhile
    pub async fn authenticate(&self) -> RpcResult<SessionIdentity> {
        let (config, generation) = {
            let state = self.state.read().await;
            let config = state
                .config
                .clone()
                .ok_or(PreconditionError::NotConfigured)?;
            (config, state.generation)
        };

        let envelope = RpcEnvelope::call(
            Service::Common,
            "authenticate",
            vec![
                json!(config.database),
                json!(config.username),
                json!(config.password),
                json!({}),
            ],
        );
        tracing::debug!(
            database = %config.database,
            username = %config.username,
            id = %envelope.id(),
            "Authenticating"
        );

        let response = self
            .transport
            .post_json(&config.jsonrpc_endpoint(), &envelope.to_value(&self.defaults)?)
            .await?;

        let result = match decode_response(response)? {
            RpcOutcome::Success(result) => result,
            RpcOutcome::Failure(err) => {
                tracing::warn!("Authentication error from '{}': {}", config.url, err);
                return Err(RpcError::RemoteAuth(err));
            }
        };

        let Some(identity) = SessionIdentity::from_authenticate_result(&result) else {
            tracing::warn!(
                "Authentication rejected for '{}' on database '{}'",
                config.username,
                config.database
            );
            return Err(RpcError::AuthenticationRejected {
                database: config.database.clone(),
                username: config.username.clone(),
            });
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            return Err(PreconditionError::Reconfigured.into());
        }
        state.identity = Some(identity);

        tracing::info!(
            "Authenticated as uid {} on '{}'",
            identity.user_id,
            config.database
        );
        Ok(identity)
    }

    /// Database names available on the configured server. Needs no authentication.
    ///
    /// # Errors
    /// - [`PreconditionError::NotConfigured`] before `configure`
    /// - [`RpcError::Remote`] if the server reports an error
    /// - [`RpcError::InvalidResponse`] if the result is not a list of names
    pub async fn list_databases(&self) -> RpcResult<Vec<String>> {
        let config = self.require_config().await?;
        let envelope = RpcEnvelope::database_list();

        let response = self
            .transport
            .post_json(
                &config.database_list_endpoint(),
                &envelope.to_value(&self.defaults)?,
            )
            .await?;

        match decode_response(response)? {
            RpcOutcome::Success(result) => serde_json::from_value(result).map_err(|e| {
                RpcError::InvalidResponse(format!("database list is not a list of names: {e}"))
            }),
            RpcOutcome::Failure(err) => {
                tracing::warn!("Database listing failed on '{}': {}", config.url, err);
                Err(RpcError::Remote(err))
            }
        }
    }

    /// Server version information from `common.version`. Needs no authentication.
    ///
    /// # Errors
    /// - [`PreconditionError::NotConfigured`] before `configure`
    /// - [`RpcError::Remote`] if the server reports an error
    pub async fn server_version(&self) -> RpcResult<Value> {
        let config = self.require_config().await?;
        let envelope = RpcEnvelope::call(Service::Common, "version", Vec::new());

        let response = self
            .transport
            .post_json(&config.jsonrpc_endpoint(), &envelope.to_value(&self.defaults)?)
            .await?;

        match decode_response(response)? {
            RpcOutcome::Success(result) => Ok(result),
            RpcOutcome::Failure(err) => Err(RpcError::Remote(err)),
        }
    }

    /// Gateway bound to the current configuration and identity.
    ///
    /// # Errors
    /// Returns [`PreconditionError::NotConfigured`] or
    /// [`PreconditionError::NotAuthenticated`]; no request is made in either case.
    pub async fn gateway(&self) -> RpcResult<RpcGateway<T>> {
        let state = self.state.read().await;
        let config = state
            .config
            .clone()
            .ok_or(PreconditionError::NotConfigured)?;
        let identity = state.identity.ok_or(PreconditionError::NotAuthenticated)?;

        Ok(RpcGateway::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.defaults),
            config,
            identity,
        ))
    }

    /// Current configuration, if any.
    pub async fn config(&self) -> Option<Arc<ConnectionConfig>> {
        self.state.read().await.config.clone()
    }

    /// Current identity, if authenticated.
    pub async fn identity(&self) -> Option<SessionIdentity> {
        self.state.read().await.identity
    }

    pub async fn is_authenticated(&self) -> bool {
        self.identity().await.is_some()
    }

    async fn require_config(&self) -> Result<Arc<ConnectionConfig>, PreconditionError> {
        self.state
            .read()
            .await
            .config
            .clone()
            .ok_or(PreconditionError::NotConfigured)
    }
}
