//! Core pieces shared by the linecast server and client: endpoint
//! defaults and tracing setup.

pub mod net;
pub mod tracing;

pub use net::{DEFAULT_BACKLOG, DEFAULT_CLIENT_HOST, DEFAULT_PORT, Endpoint, default_bind_addr};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
