//! swarmctl - a Docker Swarm command-line client
//!
//! This is the main CLI entry point for swarmctl.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use swarmctl::client::{HttpClient, DEFAULT_HOST};
use swarmctl::commands::config::{InspectOptions, ListOptions};
use swarmctl::commands::stack::ServicesOptions;
use swarmctl::commands::{self, Cli};
use swarmctl::config::CliConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// swarmctl - Docker Swarm command-line client
#[derive(Parser)]
#[command(name = "swarmctl")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "List and inspect Docker Swarm stacks, services and configs", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    /// Swarm manager to connect to (tcp://, http:// or https://)
    #[arg(short = 'H', long, global = true, env = "SWARMCTL_HOST")]
    host: Option<String>,

    /// Location of the client configuration directory
    #[arg(long, global = true, env = "SWARMCTL_CONFIG", value_name = "DIR")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stacks
    Stack {
        #[command(subcommand)]
        command: StackCommands,
    },

    /// Manage Swarm configs
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum StackCommands {
    /// List the services in the stack
    Services(ServicesOptions),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List configs
    #[command(name = "ls", visible_alias = "list")]
    List(ListOptions),
    /// Display detailed information on one or more configs
    Inspect(InspectOptions),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so they never mix with command output
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config_file =
        CliConfig::load(args.config.as_deref()).context("failed to load client configuration")?;

    let host = args
        .host
        .or_else(|| config_file.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let client = HttpClient::new(&host)?;
    debug!("using swarm manager at {}", client.base_url());

    let mut cli = Cli::new(Arc::new(client), config_file, io::stdout(), io::stderr());

    match args.command {
        Commands::Stack { command } => match command {
            StackCommands::Services(opts) => commands::stack::run_services(&mut cli, &opts).await?,
        },
        Commands::Config { command } => match command {
            ConfigCommands::List(opts) => commands::config::run_list(&mut cli, &opts).await?,
            ConfigCommands::Inspect(opts) => commands::config::run_inspect(&mut cli, &opts).await?,
        },
    }

    cli.out().flush()?;
    Ok(())
}
