use anyhow::Context as _;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use stringsvc::{http, new_service, Endpoints};
use tokio::net::TcpListener;
use tower_kit::core::{MetricsFacade, TracingTracer};
use tracing_subscriber::EnvFilter;

/// Uppercase and count strings over JSON/HTTP.
#[derive(Debug, Parser)]
#[command(name = "stringsvc", version)]
struct Args {
    /// HTTP listen address
    #[arg(long, env = "STRINGSVC_HTTP_ADDR", default_value = "0.0.0.0:8081")]
    http_addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let svc = new_service(Some(Arc::new(MetricsFacade::new())));
    let endpoints = Endpoints::new(svc, Some(Arc::new(TracingTracer)));
    let app = http::router(endpoints);

    let listener = TcpListener::bind(args.http_addr)
        .await
        .with_context(|| format!("binding {}", args.http_addr))?;
    tracing::info!(transport = "HTTP", addr = %args.http_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("goodbye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
