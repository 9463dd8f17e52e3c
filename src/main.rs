//! Accounts gateway.
//!
//! Front door for the authentication module of a web application.
//!
//! ```text
//!     Client Request
//!     ───────────────▶ axum server ──▶ route table ──┬──▶ register/  ─▶ registration view
//!                      (request id,    (mount,       ├──▶ login/     ─▶ login view
//!                       tracing)        first match) ├──▶ logout/    ─▶ logout view
//!                                                    └──▶ everything ─▶ social-auth table
//!                                                         else
//! ```
//!
//! Views and the social-auth table are upstream services; the gateway only
//! decides which one answers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use accounts_gateway::config::{load_config, GatewayConfig};
use accounts_gateway::lifecycle::{build_server, signals, start_metrics, Shutdown, StartupError};
use accounts_gateway::observability::logging;
use accounts_gateway::routing::RouteTable;

#[derive(Parser)]
#[command(name = "accounts-gateway", version)]
#[command(about = "Routes register/login/logout to their views and delegates the rest to social auth", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway (default)
    Serve,
    /// Print the route table and exit
    Routes {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await?,
        Commands::Routes { json } => print_routes(&RouteTable::accounts(&config.accounts.mount), json)?,
    }

    Ok(())
}

async fn serve(config: GatewayConfig) -> Result<(), StartupError> {
    logging::init(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "accounts-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount = %config.accounts.mount,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    start_metrics(&config)?;
    let server = build_server(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(table: &RouteTable, json: bool) -> Result<(), serde_json::Error> {
    let routes = table.describe();

    if json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    println!("{:<12} {:<28} {:<16} NAME", "PATTERN", "PATH", "TARGET");
    for route in routes {
        println!(
            "{:<12} {:<28} {:<16} {}",
            route.pattern,
            route.path,
            route.target,
            route.name.unwrap_or("-")
        );
    }
    Ok(())
}
