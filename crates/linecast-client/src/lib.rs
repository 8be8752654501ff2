//! CLI, chat session, configuration
//!
//! This crate provides the `linecast` command-line interface: an
//! interactive chat client and, through `linecast server`, the broadcast
//! server in the foreground.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod liveness;
pub mod session;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use liveness::Liveness;
pub use session::{ChatSession, SessionSummary};
