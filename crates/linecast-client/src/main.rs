//! linecast CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use linecast_client::cli::{Cli, Command, ConfigAction};
use linecast_client::config::ClientConfig;
use linecast_client::error::{ClientError, ClientResult};
use linecast_core::{Endpoint, TracingConfig, TracingOutputFormat, init_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        match ClientConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", ClientError::Config(e));
                return ExitCode::FAILURE;
            }
        }
    } else {
        ClientConfig::load().unwrap_or_default()
    };

    // Initialize tracing
    let mut tracing_config = match cli.command {
        Some(Command::Server { json_logs: true, .. }) => {
            TracingConfig::server().with_format(TracingOutputFormat::Json)
        }
        Some(Command::Server { .. }) => TracingConfig::server(),
        _ => TracingConfig::chat(),
    };
    if cli.debug || config.debug {
        tracing_config = tracing_config.with_debug();
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    // The server loop is single threaded; the chat session runs its two
    // channels side by side.
    let runtime = if cli.is_server() {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
    } else {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
    };
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(cli, config));
    // Console reads park a blocking thread that would otherwise hold up exit.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    match cli.command {
        Some(Command::Server { bind, backlog, .. }) => {
            linecast_client::commands::server::run(bind, backlog).await
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => linecast_client::commands::config::dump(&config),
            ConfigAction::Path => linecast_client::commands::config::path(),
        },
        None => {
            let endpoint = Endpoint::new(
                cli.host.unwrap_or(config.server.host),
                cli.port.unwrap_or(config.server.port),
            );
            let name = cli.name.or(config.name);
            linecast_client::commands::chat::run(endpoint, name).await
        }
    }
}
