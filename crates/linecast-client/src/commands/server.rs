//! Server command: runs the broadcast server in the foreground.

use std::net::SocketAddr;

use linecast_server::{BroadcastServer, ServerConfig};
use tracing::{info, warn};

use crate::error::ClientResult;

/// Binds the listener and serves until ctrl-c.
pub async fn run(bind: SocketAddr, backlog: u32) -> ClientResult<()> {
    let config = ServerConfig::new(bind).with_backlog(backlog);
    let mut server = BroadcastServer::bind(config)?;

    server.run_until_shutdown(shutdown_signal()).await;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received interrupt, shutting down"),
        Err(e) => {
            // Without a signal handler the server simply runs until killed.
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
