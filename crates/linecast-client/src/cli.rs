//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linecast_core::{DEFAULT_BACKLOG, default_bind_addr};

/// linecast - broadcast chat over TCP
#[derive(Debug, Parser)]
#[command(name = "linecast")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "LINECAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    // --- Connection flags ---
    /// Server host to connect to
    #[arg(long, env = "LINECAST_HOST")]
    pub host: Option<String>,

    /// Server port to connect to
    #[arg(long, short, env = "LINECAST_PORT")]
    pub port: Option<u16>,

    /// Name shown before your messages
    #[arg(long, short)]
    pub name: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Whether the selected command runs the server.
    pub fn is_server(&self) -> bool {
        matches!(self.command, Some(Command::Server { .. }))
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the broadcast server in the foreground
    Server {
        /// Address to listen on
        #[arg(long, default_value_t = default_bind_addr())]
        bind: SocketAddr,

        /// Maximum number of pending connections
        #[arg(long, default_value_t = DEFAULT_BACKLOG)]
        backlog: u32,

        /// Emit logs as JSON
        #[arg(long)]
        json_logs: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["linecast", "--name", "alice", "-p", "6000"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.is_server());
        assert_eq!(cli.name.as_deref(), Some("alice"));
        assert_eq!(cli.port, Some(6000));
    }

    #[test]
    fn server_defaults() {
        let cli = Cli::try_parse_from(["linecast", "server"]).unwrap();
        assert!(cli.is_server());
        match cli.command {
            Some(Command::Server {
                bind,
                backlog,
                json_logs,
            }) => {
                assert_eq!(bind, "0.0.0.0:50000".parse::<SocketAddr>().unwrap());
                assert_eq!(backlog, 5);
                assert!(!json_logs);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn server_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "linecast",
            "server",
            "--bind",
            "127.0.0.1:4000",
            "--backlog",
            "64",
            "--json-logs",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Server {
                bind,
                backlog,
                json_logs,
            }) => {
                assert_eq!(bind.port(), 4000);
                assert_eq!(backlog, 64);
                assert!(json_logs);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(Cli::try_parse_from(["linecast", "--port", "70000"]).is_err());
    }
}
