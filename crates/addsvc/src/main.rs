use addsvc::{http, new_service, Config, Endpoints};
use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use stringsvc::StringService;
use tokio::net::TcpListener;
use tower_kit::core::{MetricsFacade, TracingTracer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    tracing::debug!(?config, "configuration");

    let postprocess = match &config.postprocess_url {
        Some(url) => {
            let strings = stringsvc::http::client(url)
                .with_context(|| format!("postprocess url {url}"))?;
            tracing::info!(url = %url, "uppercasing concat results remotely");
            Some(Arc::new(strings) as Arc<dyn StringService>)
        }
        None => None,
    };

    let recorder = Arc::new(MetricsFacade::new());
    let svc = new_service(config.max_concat_len, Some(recorder.clone()), postprocess);
    let settings = config
        .endpoint_settings()
        .with_recorder(recorder)
        .with_tracer(Arc::new(TracingTracer));
    let app = http::router(Endpoints::new(svc, &settings));

    let listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("binding {}", config.http_addr))?;
    tracing::info!(transport = "HTTP", addr = %config.http_addr, "listening");

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
