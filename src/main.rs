use anyhow::Context;
use bookstore_api::api::build_router;
use bookstore_api::config::{Config, LoggingConfig};
use bookstore_api::storage::DocumentStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    init_tracing(&config.logging)?;

    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                let raw = args.get(i + 1).context("--bind requires <addr:port>")?;
                config.bind_addr = raw
                    .parse::<SocketAddr>()
                    .with_context(|| format!("Invalid --bind address: {}", raw))?;
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--bind <addr:port>]", args[0]);
                eprintln!("Example: {} --bind 127.0.0.1:3000", args[0]);
                return Ok(());
            }
            _ => {
                i += 1;
            }
        }
    }

    tracing::info!(
        "Starting bookstore API on {} ({})",
        config.bind_addr,
        config.environment
    );
    if config.auth.allowed_tokens.is_empty() {
        tracing::warn!("ALLOWED_TOKENS is empty: every write request will be rejected");
    }

    // 1. Storage:
    let store = Arc::new(DocumentStore::new(&config.data));
    store.ensure_initialized().await?;
    tracing::info!(
        "Data files: {} / {}",
        config.data.books_path.display(),
        config.data.reviews_path.display()
    );

    // 2. HTTP API:
    let bind_addr = config.bind_addr;
    let api_prefix = config.api_prefix.clone();
    let app = build_router(Arc::new(config), store);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("API available under http://{}{}", bind_addr, api_prefix);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&logging.level)
        .with_context(|| format!("Invalid LOG_LEVEL: {}", logging.level))?;

    match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Arc::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

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

    tracing::info!("Shutdown signal received, draining connections");
}
