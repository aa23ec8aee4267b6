//! `tenantctl setup` - bootstrap tenants against a running server.
//!
//! Reads a JSON array of `{provider, url, tenantName}` records and POSTs each
//! to /setup-tenant in order, continuing past per-tenant failures.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{error, info};

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Tenant definitions file
    #[arg(long, default_value = "tenants.json")]
    file: PathBuf,

    /// Base URL of the running server
    #[arg(long, default_value = "http://localhost:3000")]
    endpoint: String,
}

pub async fn run(args: SetupArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let tenants: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of tenant records", args.file.display()))?;

    let client = reqwest::Client::new();
    let target = format!("{}/setup-tenant", args.endpoint.trim_end_matches('/'));

    let mut failures = 0usize;
    for tenant in &tenants {
        let label = tenant
            .get("tenantName")
            .and_then(|name| name.as_str())
            .unwrap_or("<unnamed>");

        match post_tenant(&client, &target, tenant).await {
            Ok(body) => info!(tenant = label, response = %body, "tenant set up"),
            Err(err) => {
                failures += 1;
                error!(tenant = label, "setup failed: {err:#}");
            }
        }
    }

    info!(
        "{} of {} tenants set up",
        tenants.len() - failures,
        tenants.len()
    );
    if failures > 0 {
        bail!("{failures} tenant(s) failed to set up");
    }
    Ok(())
}

async fn post_tenant(
    client: &reqwest::Client,
    target: &str,
    tenant: &serde_json::Value,
) -> Result<serde_json::Value> {
    let response = client.post(target).json(tenant).send().await?;
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);

    if !status.is_success() {
        bail!("HTTP {status}: {body}");
    }
    Ok(body)
}
