//! Network endpoint defaults.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

/// TCP port the server listens on and the client connects to by default.
pub const DEFAULT_PORT: u16 = 50000;

/// Number of pending, not yet accepted connections the listener queues.
pub const DEFAULT_BACKLOG: u32 = 5;

/// Host the client connects to when nothing else is configured.
pub const DEFAULT_CLIENT_HOST: &str = "127.0.0.1";

/// Returns the default server bind address: all interfaces, default port.
pub fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}

/// A host/port pair the client dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bare IPv6 literals need brackets to be dialable.
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
