//! Session management and RPC gateway for the Odoo JSON-RPC client.
//!
//! Provides:
//! - `SessionManager` - Configure, authenticate, list databases
//! - `RpcGateway` - Model introspection and CRUD through `execute_kw`

pub mod gateway;
pub mod manager;

#[cfg(test)]
mod testing;

pub use gateway::RpcGateway;
pub use manager::SessionManager;
