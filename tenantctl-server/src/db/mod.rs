//! Database layer: connection lifecycle, migrations, repositories, verifier.

pub mod manager;
pub mod migrate;
pub mod provision;
pub mod repos;
pub mod verifier;

use std::sync::Once;

pub use manager::{ConnectionError, ConnectionManager, Connector, SqlxConnector, TenantConnections};
pub use migrate::MigrationError;
pub use repos::DbError;

static INSTALL_DRIVERS: Once = Once::new();

/// Registers sqlx's `Any` drivers for the enabled backends.
///
/// Safe to call from multiple entry points; only the first call installs.
pub fn install_drivers() {
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
}

#[cfg(test)]
pub(crate) mod testing {
    use tenantctl_core::{ConnectionConfig, Provider};

    /// File-backed SQLite database for tests. In-memory SQLite gives each
    /// pooled connection its own database, so tests use temp files.
    pub(crate) fn sqlite_config() -> (tempfile::TempDir, ConnectionConfig) {
        super::install_drivers();
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        (dir, ConnectionConfig::new(Provider::Sqlite, url))
    }

    pub(crate) async fn sqlite_pool(config: &ConnectionConfig) -> sqlx::AnyPool {
        sqlx::any::AnyPoolOptions::new()
            .max_connections(2)
            .connect(&config.url)
            .await
            .expect("sqlite pool")
    }
}
