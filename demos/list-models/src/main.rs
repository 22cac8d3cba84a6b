//! Connect to an Odoo server and print its databases, models, or a model's fields.
//!
//! Run with: cargo run -p list-models-demo [model]
//!
//! Connection settings come from `ODOO_URL`, `ODOO_DATABASE`, `ODOO_USERNAME`
//! and `ODOO_PASSWORD`, optionally via a `.env` file.

use std::sync::Arc;

use anyhow::Context;
use odoo_rpc_core::ConnectionConfig;
use odoo_rpc_session::SessionManager;
use odoo_rpc_transport::HttpTransport;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {e}");
    }

    let config = ConnectionConfig::from_env().context("incomplete connection settings")?;
    let transport = Arc::new(HttpTransport::new()?);
    let manager = SessionManager::new(transport);

    manager.configure(config).await;

    match manager.list_databases().await {
        Ok(databases) => tracing::info!("Databases: {}", databases.join(", ")),
        // Listing is often disabled on production servers.
        Err(e) => tracing::warn!("Could not list databases: {e}"),
    }

    let identity = manager.authenticate().await.context("authentication failed")?;
    tracing::info!("Logged in as uid {}", identity.user_id);

    let gateway = manager.gateway().await?;
    let output = match std::env::args().nth(1) {
        Some(model) => gateway
            .list_model_attributes(&model)
            .await
            .with_context(|| format!("failed to read fields of '{model}'"))?,
        None => gateway.list_models().await.context("failed to list models")?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
