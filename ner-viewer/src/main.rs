//! Servidor web Axum para visualização das entidades reconstruídas sobre o texto

mod config;
mod error;
mod remote;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{CliArgs, ViewerConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level).context("invalid log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ViewerConfig::from_cli(args)?;
    let state = Arc::new(AppState::from_config(&config)?);
    info!(
        tagger = config.tagger.name(),
        max_text_bytes = config.max_text_bytes,
        "configuração carregada"
    );

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.bind))?;
    info!("🚀 Servidor NER iniciado em http://{}", config.bind);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
