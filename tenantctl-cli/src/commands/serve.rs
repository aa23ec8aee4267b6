//! `tenantctl serve` - run the HTTP server.

use anyhow::Result;
use clap::Args;
use tenantctl_server::{run_server, ServerConfig};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (default: HOST env or 0.0.0.0)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (default: PORT env or 3000)
    #[arg(long, short)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = ServerConfig::default();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    run_server(config).await?;
    Ok(())
}
