//! Schema migrations.
//!
//! The runner is invoked per entity-create request rather than once at
//! startup, so it must be cheap when there is nothing to do: every statement
//! is `IF NOT EXISTS` and reapplying is a successful no-op.

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use thiserror::Error;

use tenantctl_core::ConnectionConfig;

/// Error applying schema migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to connect to '{url}' for migration: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to apply migrations: {0}")]
    Apply(#[source] sqlx::Error),
}

/// Applies pending schema migrations to the database behind `config`.
///
/// Opens a private single-connection pool and closes it before returning.
pub async fn run(config: &ConnectionConfig) -> Result<(), MigrationError> {
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect(&config.url)
        .await
        .map_err(|source| MigrationError::Connect {
            url: config.url.clone(),
            source,
        })?;

    let result = apply(&pool, config).await;
    pool.close().await;
    result
}

async fn apply(pool: &AnyPool, config: &ConnectionConfig) -> Result<(), MigrationError> {
    for statement in config.provider.schema_sql() {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(MigrationError::Apply)?;
    }
    tracing::debug!(provider = %config.provider, "migrations applied");
    Ok(())
}
