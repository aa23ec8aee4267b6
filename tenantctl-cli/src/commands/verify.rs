//! `tenantctl verify` - run database verification checks in-process.

use anyhow::{bail, Result};
use clap::Args;

use tenantctl_core::{config::default_database_url, ConnectionConfig, Provider};
use tenantctl_server::{install_drivers, DatabaseVerifier};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Database provider: postgresql, mysql, or sqlite
    #[arg(long, default_value = "postgresql")]
    provider: String,

    /// Connection URL (default: DATABASE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Tenant name to look up
    #[arg(long)]
    tenant_name: Option<String>,

    /// User email to look up
    #[arg(long)]
    user_email: Option<String>,
}

pub async fn run(args: VerifyArgs) -> Result<()> {
    install_drivers();

    let provider: Provider = args.provider.parse()?;
    let url = args.url.unwrap_or_else(default_database_url);

    let verifier = DatabaseVerifier::new(ConnectionConfig::new(provider, url));
    let report = verifier
        .run_full_verification(args.tenant_name.as_deref(), args.user_email.as_deref())
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.success {
        bail!("verification failed");
    }
    Ok(())
}
