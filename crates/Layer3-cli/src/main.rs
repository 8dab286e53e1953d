//! RelayHook CLI - Main entry point

mod config_cmd;
mod hooks_cmd;
mod simulate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// RelayHook - hook pipeline tooling for the LLM relay
#[derive(Parser, Debug)]
#[command(name = "relayhook")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the plugin configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect relay hooks
    Hooks {
        #[command(subcommand)]
        action: HooksAction,
    },
    /// Run the hook pipeline offline against a recorded upstream response
    Simulate {
        /// Request body (JSON file)
        #[arg(long)]
        request: PathBuf,

        /// Upstream response body (JSON or SSE file)
        #[arg(long)]
        response: PathBuf,

        /// Request URL path
        #[arg(long, default_value = "/v1/chat/completions")]
        path: String,

        /// Upstream response status
        #[arg(long, default_value_t = 200)]
        status: u16,

        /// Treat the upstream response as an SSE stream
        #[arg(long)]
        stream: bool,

        /// Plugin config file (defaults to PLUGIN_CONFIG_PATH or config/plugins.yaml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a sample configuration file
    Init {
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the loaded configuration (after env expansion)
    Show {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Parse the configuration file and report problems
    Validate {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum HooksAction {
    /// List registered relay hooks
    List {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match args.command {
        Command::Config { action } => match action {
            ConfigAction::Init { path, force } => config_cmd::init(path.as_deref(), force),
            ConfigAction::Show { path } => config_cmd::show(path.as_deref()),
            ConfigAction::Validate { path } => config_cmd::validate(path.as_deref()),
        },
        Command::Hooks { action } => match action {
            HooksAction::List { path } => hooks_cmd::list(path.as_deref()),
        },
        Command::Simulate {
            request,
            response,
            path,
            status,
            stream,
            config,
        } => {
            let options = simulate::SimulateOptions {
                request,
                response,
                url_path: path,
                status,
                stream,
                config,
            };
            simulate::run(options).await
        }
    }
}
