use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;

mod config;
mod db;
mod error;
mod export;
mod llm;
mod pipeline;
mod report;
mod routes;
mod telemetry;

use config::Config;
use report::SampleReport;
use telemetry::init_telemetry;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    /// `None` when the LLM provider has no credentials; reports then come
    /// from the sample.
    pub llm_client: Option<Arc<llm::LlmClient>>,
    pub sample: Arc<SampleReport>,
}

fn load_sample(config: &Config) -> anyhow::Result<SampleReport> {
    match config.sample_report_path.as_deref() {
        Some(path) => {
            tracing::info!(path, "Loading sample report override");
            SampleReport::from_path(Path::new(path))
        }
        None => SampleReport::builtin(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(
        port = config.port,
        environment = %config.environment,
        llm_provider = %config.llm_provider,
        "Starting market-report-service"
    );

    let state = AppState {
        pool: db::create_pool(&config.database_url).await?,
        config: config.clone(),
        llm_client: llm::build_client(&config).map(Arc::new),
        sample: Arc::new(load_sample(&config)?),
    };

    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    telemetry_guard.shutdown();

    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
