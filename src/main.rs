//! Slidesmith server entry point.
//!
//! Loads `.env`, initializes tracing, reads the JSON config file with environment
//! overrides, and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use slidesmith::api;
use slidesmith::app::App;
use slidesmith::services::settings_engine::{api_key_from_env, SettingsEngine, SettingsEngineTrait};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slidesmith=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let env = |key: &str| std::env::var(key).ok();

    let mut engine = SettingsEngine::new(env("SLIDESMITH_CONFIG"));
    engine
        .load()
        .with_context(|| format!("loading settings from {}", engine.get_config_path()))?;
    engine.apply_env(env).context("applying environment overrides")?;
    let settings = engine.get_settings().clone();

    let addr = settings.server.bind_address();
    let app = App::from_settings(settings, api_key_from_env(env)).context("building AI client")?;
    let router = api::router(Arc::new(app));

    info!("Starting Slidesmith on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Slidesmith stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
