//! Verification endpoints.
//!
//! Each endpoint wraps one verifier check (or the full sequence). Check
//! outcomes are reported in the body with HTTP 200; only request validation
//! problems and transport-level failures map to error statuses.

use axum::{routing::post, Json, Router};
use serde::Deserialize;

use crate::db::verifier::{DatabaseVerifier, VerificationResult};
use crate::http::error::ApiError;
use crate::http::extractors::DbConfigParams;

/// Verification request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(flatten)]
    pub db: DbConfigParams,
    pub tenant_name: Option<String>,
    pub user_email: Option<String>,
}

impl VerifyRequest {
    fn into_verifier(self) -> Result<(DatabaseVerifier, Option<String>, Option<String>), ApiError> {
        let config = self.db.into_config()?;
        Ok((
            DatabaseVerifier::new(config),
            self.tenant_name,
            self.user_email,
        ))
    }
}

/// POST /verify-connection
async fn verify_connection(
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let (verifier, _, _) = req.into_verifier()?;
    Ok(Json(verifier.verify_connection().await))
}

/// POST /verify-tables
async fn verify_tables(
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let (verifier, _, _) = req.into_verifier()?;
    Ok(Json(verifier.verify_tables().await))
}

/// POST /verify-tenant
async fn verify_tenant(
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let (verifier, tenant_name, _) = req.into_verifier()?;
    let Some(tenant_name) = tenant_name else {
        return Err(ApiError::validation("tenantName is required"));
    };
    Ok(Json(verifier.verify_tenant_data(&tenant_name).await))
}

/// POST /verify-user
async fn verify_user(
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let (verifier, _, user_email) = req.into_verifier()?;
    let Some(user_email) = user_email else {
        return Err(ApiError::validation("userEmail is required"));
    };
    Ok(Json(verifier.verify_user_data(&user_email).await))
}

/// POST /get-all-tenants
async fn get_all_tenants(
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let (verifier, _, _) = req.into_verifier()?;
    Ok(Json(verifier.all_tenants().await))
}

/// POST /get-all-users
async fn get_all_users(
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let (verifier, _, _) = req.into_verifier()?;
    Ok(Json(verifier.all_users().await))
}

/// POST /verify-database - full check sequence.
async fn verify_database(
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let (verifier, tenant_name, user_email) = req.into_verifier()?;
    Ok(Json(
        verifier
            .run_full_verification(tenant_name.as_deref(), user_email.as_deref())
            .await,
    ))
}

/// Verification routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/verify-connection", post(verify_connection))
        .route("/verify-tables", post(verify_tables))
        .route("/verify-tenant", post(verify_tenant))
        .route("/verify-user", post(verify_user))
        .route("/get-all-tenants", post(get_all_tenants))
        .route("/get-all-users", post(get_all_users))
        .route("/verify-database", post(verify_database))
}
