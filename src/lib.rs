pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod fs_utils;
pub mod models;
pub mod router;
pub mod state;
pub mod store;

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use commands::generate::{generate_image, run_generation};
pub use config::ServerConfig;
pub use error::{classify_provider_failure, GenerateError, GenerateResult};
pub use models::{
    GenerateImageBody, GeneratedImage, GenerationMetadata, GenerationMode, GenerationResult,
    InlineImagePayload, SavedImage, UserProfile,
};
pub use router::build_app_router;
pub use state::AppState;
pub use store::{FileStore, LocalStore, MemoryStore, StoreError};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "post_factory=debug,post_factory_lib=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        image_model = %config.image_model,
        text_model = %config.text_model,
        fallback_key = config.api_key.is_some(),
        "Loaded server configuration"
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let app = build_app_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
