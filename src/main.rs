use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scribe_gateway::config::Args;
use scribe_gateway::routes::build_router;
use scribe_gateway::state::AppState;
use scribe_gateway::upstream::OpenAiBackend;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let backend = Arc::new(OpenAiBackend::new(
        args.upstream_url.clone(),
        args.api_key.clone(),
        args.model.clone(),
    ));
    let state = Arc::new(AppState::new(backend, args.rate_limit, args.rate_window));

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Gateway running on http://localhost:{}", args.port);
    tracing::info!("Upstream: {} (model {})", args.upstream_url, args.model);
    tracing::info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit,
        args.rate_window
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
