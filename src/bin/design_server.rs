//! Design Director HTTP server
//!
//! Usage:
//!   cargo run --bin design_server
//!
//! Configuration comes from the environment (a `.env` file is honoured); see
//! `design_director::config`.

use std::sync::Arc;

use anyhow::Context;
use dd_agentic::create_llm_client;
use design_director::api::{create_app, AppState};
use design_director::{DesignConfig, DesignGenerator, DesignStore, DesignTokenSet, TokenNormalizer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "design_director=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DesignConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        backend = config.backend.name(),
        mode = ?config.validation_mode,
        "Starting Design Director"
    );

    let normalizer = TokenNormalizer::new(config.validation_mode);

    let generator = match create_llm_client(
        config.backend,
        config.api_key.as_deref(),
        config.model.as_deref(),
        config.base_url.as_ref().map(Url::as_str),
        config.completion,
    ) {
        Ok(client) => Some(Arc::new(DesignGenerator::new(client, normalizer.clone()))),
        Err(e) => {
            tracing::warn!("{}", e);
            tracing::warn!("Design generation will answer with an error until a key is set");
            None
        }
    };

    let store = DesignStore::new(DesignTokenSet::default());
    let state = AppState::new(store, generator, normalizer, config.public_url.clone());
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!("Design Director listening on http://{}", config.bind_addr);
    tracing::info!("  POST /api/design         - Generate design tokens");
    tracing::info!("  POST /api/design/remix   - Remix current design");
    tracing::info!("  GET  /api/theme/share    - Shareable link");
    tracing::info!("  GET  /api/theme/css      - Applied stylesheet");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
