//! Core abstractions for the Odoo JSON-RPC client.
//!
//! This crate provides the fundamental building blocks:
//! - `ConnectionConfig` / `EnvelopeDefaults` - Where to connect and what every envelope carries
//! - `RpcEnvelope` - Uniform `call` envelope and response classification
//! - `SessionIdentity` - The uid obtained by authentication
//! - `Transport` trait - The HTTP collaborator seam
//! - Error types shared by all crates

pub mod config;
pub mod envelope;
pub mod error;
pub mod session;
pub mod traits;

pub use config::{ConfigError, ConnectionConfig, EnvelopeDefaults};
pub use envelope::{CallParams, RecordId, RpcEnvelope, RpcOutcome, Service, decode_response};
pub use error::{
    PreconditionError, RemoteError, RemoteErrorKind, RpcError, RpcResult, TransportError,
};
pub use session::{SessionIdentity, UserId};
pub use traits::Transport;
