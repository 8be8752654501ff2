//! Broadcast server: connection registry, router and readiness loop.
//!
//! One task owns every connection. Each turn of the loop waits until the
//! listener or at least one connection is ready, accepts newcomers, reads
//! whole frames and fans them out to every other connection's outbound
//! queue, then writes at most one queued frame per writable connection.
//!
//! # Example
//!
//! ```rust,no_run
//! use linecast_server::{BroadcastServer, ServerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = BroadcastServer::bind(ServerConfig::default())?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod queue;
mod registry;
mod router;
mod server;

pub use config::{DEFAULT_WELCOME, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use queue::OutboundQueue;
pub use registry::{Connection, ConnectionId, ConnectionRegistry};
pub use router::BroadcastRouter;
pub use server::BroadcastServer;
