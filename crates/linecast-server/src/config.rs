//! Server configuration.

use std::net::SocketAddr;

use linecast_core::{DEFAULT_BACKLOG, default_bind_addr};
use linecast_protocol::FrameLayout;

use crate::error::{ServerError, ServerResult};

/// Text pushed to every newly accepted connection.
pub const DEFAULT_WELCOME: &str = "Server: Welcome!";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: SocketAddr,

    /// Pending connections the OS queues before refusing new ones.
    pub backlog: u32,

    /// Frame geometry for reads and writes.
    pub layout: FrameLayout,

    /// Greeting queued for each new connection.
    pub welcome: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            backlog: DEFAULT_BACKLOG,
            layout: FrameLayout::default(),
            welcome: DEFAULT_WELCOME.to_string(),
        }
    }
}

impl ServerConfig {
    /// Creates a configuration listening on `bind_addr`.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builder: set listen backlog.
    pub fn with_backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Builder: set frame layout.
    pub fn with_layout(mut self, layout: FrameLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builder: set welcome text.
    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome = welcome.into();
        self
    }

    /// Checks settings that the type system cannot.
    pub fn validate(&self) -> ServerResult<()> {
        if self.backlog == 0 {
            return Err(ServerError::config("backlog must be at least 1"));
        }
        if self.welcome.len() > self.layout.max_payload() {
            return Err(ServerError::config(format!(
                "welcome text is {} bytes, frames carry at most {}",
                self.welcome.len(),
                self.layout.max_payload()
            )));
        }
        Ok(())
    }
}
