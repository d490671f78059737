// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Palanque - outbound WhatsApp dispatch service for campaign messaging.
//!
//! This is the binary entry point for the dispatch service and its
//! operator commands.

mod instance_cmd;
mod serve;
mod session_cmd;

use clap::{Parser, Subcommand};

/// Palanque - outbound WhatsApp dispatch service for campaign messaging.
#[derive(Parser, Debug)]
#[command(name = "palanque", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dispatch service until interrupted.
    Serve,
    /// Start a gateway session and show its pairing QR code.
    Connect {
        /// Provider instance id.
        #[arg(long)]
        instance: i64,
    },
    /// Log the session out and show a fresh pairing QR code.
    Reconnect {
        /// Provider instance id.
        #[arg(long)]
        instance: i64,
    },
    /// Show session status for one or all provider instances.
    Status {
        /// Provider instance id; all instances when omitted.
        #[arg(long)]
        instance: Option<i64>,
    },
    /// Manage provider instances.
    #[command(subcommand)]
    Instance(instance_cmd::InstanceCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match palanque_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            palanque_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Connect { instance } => {
            session_cmd::run_connect(config, instance, false).await
        }
        Commands::Reconnect { instance } => {
            session_cmd::run_connect(config, instance, true).await
        }
        Commands::Status { instance } => session_cmd::run_status(config, instance).await,
        Commands::Instance(command) => instance_cmd::run(config, command).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("palanque={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
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
    fn connect_requires_instance_id() {
        let result = Cli::try_parse_from(["palanque", "connect"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["palanque", "connect", "--instance", "3"]).unwrap();
        match cli.command {
            Commands::Connect { instance } => assert_eq!(instance, 3),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn status_instance_is_optional() {
        let cli = Cli::try_parse_from(["palanque", "status"]).unwrap();
        match cli.command {
            Commands::Status { instance } => assert!(instance.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
