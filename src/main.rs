//! Storefront server binary
//!
//! ```text
//! storefront [config.yaml]
//! ```
//!
//! The config path may also come from `STOREFRONT_CONFIG`; without one the
//! defaults plus environment overrides are used.

use anyhow::Result;
use std::path::PathBuf;
use storefront::config::StorefrontConfig;
use storefront::server::ServerBuilder;
use storefront::storage::Storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("STOREFRONT_CONFIG").ok())
        .map(PathBuf::from);
    let config = StorefrontConfig::load(config_path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        config = ?config_path,
        backend = ?config.storage.backend,
        "Starting storefront"
    );

    let storage = Storage::from_config(&config.storage).await?;

    let mut builder = ServerBuilder::new().with_storage(storage);
    if let Some(origin) = &config.server.cors_origin {
        builder = builder.with_cors_origin(origin.clone());
    }

    builder.serve(&config.bind_address()).await
}
