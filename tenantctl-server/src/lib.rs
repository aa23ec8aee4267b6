//! tenantctl-server: per-tenant database provisioning over HTTP.
//!
//! Routes CRUD operations to tenant-specific database connections held in a
//! process-wide connection manager, applies schema migrations per target
//! database, and exposes verification checks over the same HTTP surface.

pub mod db;
pub mod http;

pub use db::manager::{ConnectionManager, Connector, SqlxConnector, TenantConnections};
pub use db::verifier::DatabaseVerifier;
pub use db::install_drivers;
pub use http::{build_router, run_server, AppState, ServerConfig};
