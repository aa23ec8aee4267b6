//! Custom Axum extractors.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::Deserialize;

use tenantctl_core::{ConnectionConfig, Provider};

use super::error::ApiError;

/// Raw provider/url fields as they arrive in a request body.
///
/// Fields stay optional so that presence checks produce the request layer's
/// 400 contract instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct DbConfigParams {
    pub provider: Option<String>,
    pub url: Option<String>,
}

impl DbConfigParams {
    /// Validates the pair into a connection config.
    pub fn into_config(self) -> Result<ConnectionConfig, ApiError> {
        let (Some(provider), Some(url)) = (self.provider, self.url) else {
            return Err(ApiError::validation("provider and url are required"));
        };
        let provider: Provider = provider
            .parse()
            .map_err(|err: tenantctl_core::provider::ParseProviderError| {
                ApiError::validation(err.to_string())
            })?;
        Ok(ConnectionConfig::new(provider, url))
    }
}

/// Extracts and validates the provider/url pair from a JSON body.
///
/// Shared validation for the tenant-scoped routes, which carry connection
/// details in the body alongside the payload.
pub struct DbConfigBody(pub ConnectionConfig);

impl<S> FromRequest<S> for DbConfigBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(params): Json<DbConfigParams> = Json::from_request(req, state)
            .await
            .map_err(|err| ApiError::validation(err.to_string()))?;
        Ok(Self(params.into_config()?))
    }
}
