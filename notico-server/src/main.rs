//! notico
//!
//! Posts Slack workspace administration events (channels, user groups, new
//! members, bots) to a notification channel. Runs either as an Events API
//! webhook server or as an RTM stream client.

mod api;
mod config;
mod server;
mod shutdown;
mod state;
mod stream;

use clap::{Args, Parser, Subcommand};
use config::{ConfigLoader, Overrides};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::{AppState, slack_publisher};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// notico - Slack workspace change notifier
#[derive(Parser, Debug)]
#[command(name = "notico")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file [default: ./notico.toml, optional]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, env = "DEBUG", global = true)]
    debug: bool,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve the Events API webhook (POST /events)
    Serve,
    /// Relay events from an RTM websocket connection
    Stream,
}

#[derive(Args, Debug, Clone)]
struct OverrideArgs {
    /// Slack API token
    #[arg(long, env = "SLACK_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Slack signing secret (required for `serve`)
    #[arg(long, env = "SLACK_SIGNING_SECRET", global = true, hide_env_values = true)]
    signing_secret: Option<String>,

    /// Channel to post notification messages [default: #admins]
    #[arg(long, env = "NOTICO_CHANNEL", global = true)]
    channel: Option<String>,

    /// Workspace domain used in links (the `acme` in acme.slack.com)
    #[arg(long, env = "SLACK_DOMAIN", global = true)]
    domain: Option<String>,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long, env = "NOTICO_LISTEN", global = true)]
    listen: Option<SocketAddr>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            token: args.token,
            signing_secret: args.signing_secret,
            channel: args.channel,
            domain: args.domain,
            listen: args.listen,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.debug);

    tracing::info!("Starting notico v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(
        cli.config.as_deref(),
        cli.overrides.into(),
        cli.command == Command::Serve,
    ));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!(
        path = ?config_loader.config_path(),
        channel = %loaded_config.slack.notify_channel,
        "Configuration loaded"
    );

    match cli.command {
        Command::Serve => {
            let listen_addr = loaded_config.server.listen;
            let sink = slack_publisher(&loaded_config.slack);
            let state = AppState::new(loaded_config.into_shared(), sink);

            // Spawn config reload handler (listens for SIGHUP)
            let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

            let router = build_router(state);

            tracing::info!("Starting HTTP server on {}", listen_addr);
            let result = run_server(router, listen_addr).await;

            // Signal the config reload handler to stop
            shutdown_notify.notify_one();
            tracing::info!("Server shutdown complete");

            result.map_err(Into::into)
        }
        Command::Stream => stream::run_stream(loaded_config.slack).await,
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// `RUST_LOG` wins; otherwise `--debug` / `DEBUG` selects the default level.
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=debug"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
