mod api;
mod error;
mod server;
mod service;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use foerder_core::config::MatchConfig;
use server::FoerderMatcherServer;
use service::MatchService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting foerder-matcher MCP server");

    let config = MatchConfig::from_env()?;
    info!(
        json_path = %config.json_path.display(),
        top_k = config.top_k,
        min_score = ?config.min_score,
        region_mode = ?config.region_mode,
        "configuration loaded"
    );

    // A broken corpus file is an operator error: fail at startup, not per request.
    let service = Arc::new(MatchService::new(config));
    let corpus = service.corpus().await?;
    info!(
        programmes = corpus.len(),
        fingerprint = %corpus.fingerprint,
        "programme corpus ready"
    );

    let server = FoerderMatcherServer::new(service);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
