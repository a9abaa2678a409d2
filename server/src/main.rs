use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use todo_core::{LocalStore, TodoStore};
use todo_server::{Config, SharedStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load();

    let store: SharedStore = match &config.data_file {
        Some(path) => Arc::new(
            LocalStore::open(path)
                .await
                .with_context(|| format!("opening todo store at {}", path.display()))?,
        ),
        None => {
            tracing::info!("no data file configured, todos are kept in memory");
            Arc::new(LocalStore::in_memory())
        }
    };
    store
        .ensure_text_index()
        .await
        .context("creating title text index")?;

    let app = todo_server::app_with_cors(store.clone(), config.cors_layer()?);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("server running on {addr}");

    todo_server::run(listener, app, shutdown_signal()).await?;

    store.close().await.context("closing todo store")?;
    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("todo_server=debug,todo_core=info,tower_http=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
