use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{config::ServerConfig, errors::Error};

use super::routes::{build_router, ApiState};

/// Serve the API until Ctrl-C or until `shutdown` is cancelled.
///
/// On Ctrl-C the token is cancelled as well, so background tasks sharing it
/// stop together with the server.
pub async fn start_api_server(
    config: &ServerConfig,
    state: ApiState,
    shutdown: CancellationToken,
) -> crate::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid API address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");
    serve(listener, build_router(state), shutdown).await?;

    info!("API server shutdown completed");
    Ok(())
}

/// Serve `router` on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> crate::Result<()> {
    let signal = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(error = %e, "API server shutdown listener failed");
                    }
                    info!("Shutdown signal received");
                    signal.cancel();
                }
                _ = signal.cancelled() => {}
            }
        })
        .await
        .map_err(|e| Error::transport(format!("API server error: {}", e)))
}
