use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use service::{runtime, storage::UserFileStore, UserService};
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

/// Build the router for a validated config.
pub fn build_app(cfg: &AppConfig) -> Router {
    let store = UserFileStore::new(&cfg.storage.path).strict(cfg.storage.strict_load);
    let state = ServerState {
        users: Arc::new(UserService::file_backed(store)),
        missing_user: cfg.storage.missing_user,
    };
    routes::build_router(state, Duration::from_secs(cfg.server.request_timeout_secs))
}

fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(err = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(err = %e, "cannot listen for SIGTERM");
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
    info!("shutdown signal received; draining in-flight requests");
}

/// Public entry: load config, bind and run the HTTP server until ctrl-c / SIGTERM.
///
/// `.env` and the tracing subscriber are the binary's job; call this after both.
pub async fn run() -> anyhow::Result<()> {
    let cfg = load_config()?;
    let addr: SocketAddr = cfg.bind_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(cfg, listener, shutdown_signal()).await
}

/// Serve a validated config on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(cfg: AppConfig, listener: tokio::net::TcpListener, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime::ensure_store_dir(&cfg.storage.path).await?;

    let app = build_app(&cfg);
    info!(
        addr = %listener.local_addr()?,
        store = %cfg.storage.path,
        strict_load = cfg.storage.strict_load,
        missing_user = ?cfg.storage.missing_user,
        "starting user api"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}
