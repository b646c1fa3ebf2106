use anyhow::{Context, Result};
use insight_core::{AppConfig, API_KEY_VARS};
use llm_interface::ChatCompletionClient;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "insight=debug,api=debug,categorizer=debug,export_data=debug,llm_interface=debug,insight_core=debug,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting Instagram Data Processor API");

    let config = AppConfig::load().context("Failed to load configuration")?;
    tracing::debug!("Configuration: {:?}", config);

    if config.llm.api_key.is_none() {
        tracing::warn!(
            "No LLM API key set ({}); categorization requests will fail",
            API_KEY_VARS.join(" or ")
        );
    }

    let client =
        ChatCompletionClient::new(config.llm.clone()).context("Failed to build LLM client")?;
    tracing::info!(
        "LLM provider {} at {} (default model {})",
        client.provider(),
        client.endpoint(),
        config.llm.default_model
    );

    tokio::fs::create_dir_all(&config.uploads.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.uploads.upload_dir.display()
            )
        })?;

    let app = api::build_router(api::AppState::new(&config, Arc::new(client)));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Export data directory: {}", config.data_dir.display());
    tracing::info!("Upload directory: {}", config.uploads.upload_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = wait_for_signal(tokio::signal::ctrl_c(), "Ctrl+C");

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

/// Resolves when the signal arrives. A listener that cannot be installed
/// never resolves, so it cannot trigger a shutdown by itself.
async fn wait_for_signal<E: Display>(listener: impl Future<Output = Result<(), E>>, name: &str) {
    if let Err(e) = listener.await {
        tracing::error!("Failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}
