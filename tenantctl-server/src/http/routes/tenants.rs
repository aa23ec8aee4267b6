//! Tenant-scoped record endpoints.
//!
//! These routes resolve their database handle through the shared connection
//! manager, keyed by the path tenant id plus the connection URL from the
//! request body.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use tenantctl_core::{Tenant, User};

use crate::db::migrate;
use crate::db::repos::{TenantRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{DbConfigBody, DbConfigParams};
use crate::http::server::AppState;

/// Create-user request body for a tenant-scoped route.
#[derive(Debug, Deserialize)]
pub struct TenantUserRequest {
    #[serde(flatten)]
    pub db: DbConfigParams,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<User>,
}

#[derive(Serialize)]
pub struct TenantsResponse {
    pub success: bool,
    pub tenants: Vec<Tenant>,
}

/// POST /tenant/{tenant_id}/users - create a user over the tenant's shared
/// handle.
async fn create_tenant_user(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    Json(req): Json<TenantUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let config = req.db.into_config()?;
    let (Some(email), Some(name)) = (req.email, req.name) else {
        return Err(ApiError::validation("email and name are required"));
    };

    migrate::run(&config).await?;
    let handle = state.connections.get_connection(&tenant_id, &config).await?;
    let user = UserRepo::new(&handle, config.provider)
        .create(&email, &name)
        .await?;

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// GET /tenant/{tenant_id}/users - list users over the tenant's shared handle.
async fn list_tenant_users(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    DbConfigBody(config): DbConfigBody,
) -> Result<Json<UsersResponse>, ApiError> {
    let handle = state.connections.get_connection(&tenant_id, &config).await?;
    let users = UserRepo::new(&handle, config.provider).list().await?;

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}

/// GET /tenant/{tenant_id}/tenants - list tenant records over the tenant's
/// shared handle.
async fn list_tenant_tenants(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    DbConfigBody(config): DbConfigBody,
) -> Result<Json<TenantsResponse>, ApiError> {
    let handle = state.connections.get_connection(&tenant_id, &config).await?;
    let tenants = TenantRepo::new(&handle, config.provider).list().await?;

    Ok(Json(TenantsResponse {
        success: true,
        tenants,
    }))
}

/// Tenant-scoped routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/tenant/{tenant_id}/users",
            get(list_tenant_users).post(create_tenant_user),
        )
        .route("/tenant/{tenant_id}/tenants", get(list_tenant_tenants))
}
