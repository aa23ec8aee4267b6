//! tenantctl - per-tenant database provisioning service
//!
//! Subcommands:
//! - `serve`: run the HTTP server
//! - `setup`: bootstrap tenants from a JSON file against a running server
//! - `verify`: run database verification checks in-process

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "tenantctl",
    version,
    about = "Per-tenant database schema and record provisioning"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// POST tenants from a JSON file to a running server
    Setup(commands::setup::SetupArgs),
    /// Run database verification checks and print a report
    Verify(commands::verify::VerifyArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();

    let cli = Cli::parse();
    tracing_setup::init(cli.debug)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Setup(args) => commands::setup::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
    }
}
