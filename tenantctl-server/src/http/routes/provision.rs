//! Tenant and user provisioning endpoints.
//!
//! Both endpoints run migrations against the target database before the
//! insert, then provision over a short-lived private handle. The shared
//! connection registry is not involved here.

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use tenantctl_core::{ConnectionConfig, Provider, Tenant, User};

use crate::db::{migrate, provision};
use crate::http::error::ApiError;

/// Setup-tenant request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupTenantRequest {
    pub provider: Option<String>,
    pub url: Option<String>,
    pub tenant_name: Option<String>,
}

impl SetupTenantRequest {
    fn validate(self) -> Result<(ConnectionConfig, String), ApiError> {
        let (Some(provider), Some(url), Some(tenant_name)) =
            (self.provider, self.url, self.tenant_name)
        else {
            return Err(ApiError::validation(
                "provider, url, and tenantName are required",
            ));
        };
        let provider: Provider = provider
            .parse()
            .map_err(|err: tenantctl_core::provider::ParseProviderError| {
                ApiError::validation(err.to_string())
            })?;
        Ok((ConnectionConfig::new(provider, url), tenant_name))
    }
}

#[derive(Serialize)]
pub struct SetupTenantResponse {
    pub success: bool,
    pub tenant: Tenant,
}

/// Add-user request body.
#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub provider: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AddUserRequest {
    fn validate(self) -> Result<(ConnectionConfig, String, String), ApiError> {
        let (Some(provider), Some(url), Some(email), Some(name)) =
            (self.provider, self.url, self.email, self.name)
        else {
            return Err(ApiError::validation(
                "provider, url, email, and name are required",
            ));
        };
        let provider: Provider = provider
            .parse()
            .map_err(|err: tenantctl_core::provider::ParseProviderError| {
                ApiError::validation(err.to_string())
            })?;
        Ok((ConnectionConfig::new(provider, url), email, name))
    }
}

#[derive(Serialize)]
pub struct AddUserResponse {
    pub success: bool,
    pub user: User,
}

/// POST /setup-tenant - migrate the target database and insert the tenant.
async fn setup_tenant(
    Json(req): Json<SetupTenantRequest>,
) -> Result<Json<SetupTenantResponse>, ApiError> {
    let (config, tenant_name) = req.validate()?;

    migrate::run(&config).await?;
    let tenant = provision::add_tenant(&config, &tenant_name).await?;

    tracing::info!(tenant = %tenant.name, id = tenant.id, "tenant set up");
    Ok(Json(SetupTenantResponse {
        success: true,
        tenant,
    }))
}

/// POST /add-user - migrate the target database and insert the user.
async fn add_user(Json(req): Json<AddUserRequest>) -> Result<Json<AddUserResponse>, ApiError> {
    let (config, email, name) = req.validate()?;

    migrate::run(&config).await?;
    let user = provision::add_user(&config, &email, &name).await?;

    tracing::info!(user = %user.email, id = user.id, "user added");
    Ok(Json(AddUserResponse {
        success: true,
        user,
    }))
}

/// Provisioning routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/setup-tenant", post(setup_tenant))
        .route("/add-user", post(add_user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::db::testing::sqlite_config;
    use crate::http::routes::testing::{json_request, send};

    fn app() -> axum::Router {
        router()
    }

    #[tokio::test]
    async fn setup_tenant_provisions_and_returns_record() {
        let (_dir, config) = sqlite_config();

        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/setup-tenant",
                json!({"provider": "sqlite", "url": config.url, "tenantName": "Acme"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["tenant"]["id"], 1);
        assert_eq!(body["tenant"]["name"], "Acme");
        assert!(body["tenant"]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn setup_tenant_missing_field_is_400() {
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/setup-tenant",
                json!({"provider": "sqlite", "tenantName": "Acme"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "provider, url, and tenantName are required");
    }

    #[tokio::test]
    async fn setup_tenant_unknown_provider_is_400() {
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/setup-tenant",
                json!({"provider": "oracle", "url": "oracle://db", "tenantName": "Acme"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("oracle"));
    }

    #[tokio::test]
    async fn setup_tenant_unreachable_database_is_500() {
        crate::db::install_drivers();

        let (status, _body) = send(
            app(),
            json_request(
                "POST",
                "/setup-tenant",
                json!({
                    "provider": "sqlite",
                    "url": "sqlite:///no/such/directory/tenants.db",
                    "tenantName": "Acme"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn add_user_twice_with_same_email_is_500() {
        let (_dir, config) = sqlite_config();
        let body = json!({
            "provider": "sqlite",
            "url": config.url,
            "email": "ada@acme.test",
            "name": "Ada"
        });

        let (status, first) = send(app(), json_request("POST", "/add-user", body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["user"]["email"], "ada@acme.test");

        let (status, second) = send(app(), json_request("POST", "/add-user", body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(second["error"].as_str().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn add_user_missing_field_is_400() {
        let (status, body) = send(
            app(),
            json_request("POST", "/add-user", json!({"email": "ada@acme.test"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "provider, url, email, and name are required");
    }
}
