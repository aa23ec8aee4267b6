//! Connection configuration.

use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// Immutable description of one tenant database: which backend and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub provider: Provider,
    pub url: String,
}

impl ConnectionConfig {
    pub fn new(provider: Provider, url: impl Into<String>) -> Self {
        Self {
            provider,
            url: url.into(),
        }
    }
}

/// Default connection URL for migration tooling and the CLI.
///
/// Reads `DATABASE_URL`, falling back to a local Postgres instance.
pub fn default_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost:5432/tenantctl".to_string())
}
