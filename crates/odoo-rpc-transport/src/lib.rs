//! HTTP transport for the Odoo JSON-RPC client.
//!
//! Provides `HttpTransport`, a `reqwest`-backed implementation of the
//! `odoo_rpc_core::Transport` trait.

pub mod http;

pub use http::{HttpTransport, HttpTransportConfig};
