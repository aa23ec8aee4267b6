//! One-shot provisioning operations.
//!
//! Each operation opens a private handle, runs the repository call, and
//! closes the handle before returning. The shared tenant registry is not
//! involved; these calls carry no concurrency contract beyond one handle per
//! call.

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use thiserror::Error;

use tenantctl_core::{ConnectionConfig, Tenant, User};

use super::manager::ConnectionError;
use super::repos::{DbError, TenantRepo, UserRepo};

/// Error from a provisioning operation.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Db(#[from] DbError),
}

async fn open(config: &ConnectionConfig) -> Result<AnyPool, ConnectionError> {
    AnyPoolOptions::new()
        .max_connections(1)
        .connect(&config.url)
        .await
        .map_err(|source| ConnectionError {
            url: config.url.clone(),
            source,
        })
}

/// Inserts a tenant record over a fresh, private connection.
pub async fn add_tenant(config: &ConnectionConfig, name: &str) -> Result<Tenant, ProvisionError> {
    let pool = open(config).await?;
    let result = TenantRepo::new(&pool, config.provider).create(name).await;
    pool.close().await;
    Ok(result?)
}

/// Inserts a user record over a fresh, private connection.
pub async fn add_user(
    config: &ConnectionConfig,
    email: &str,
    name: &str,
) -> Result<User, ProvisionError> {
    let pool = open(config).await?;
    let result = UserRepo::new(&pool, config.provider).create(email, name).await;
    pool.close().await;
    Ok(result?)
}
