//! Database verification checks.
//!
//! Every check opens and closes its own short-lived handle, deliberately
//! bypassing the tenant connection registry: verification must not pollute
//! or depend on shared state. Checks report their own failures; only a dead
//! connection short-circuits the checks that need a live one.

use serde::Serialize;
use serde_json::json;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};

use tenantctl_core::ConnectionConfig;

use super::repos::{TenantRepo, UserRepo};

/// Outcome of one verification check.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl VerificationResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    fn ok_with(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    fn error(message: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: Some(vec![err.to_string()]),
        }
    }
}

/// One labeled entry in a full verification report.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub test: &'static str,
    #[serde(flatten)]
    pub result: VerificationResult,
}

/// Stateless verifier bound to one connection config.
pub struct DatabaseVerifier {
    config: ConnectionConfig,
}

impl DatabaseVerifier {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    async fn open(&self) -> Result<AnyPool, sqlx::Error> {
        AnyPoolOptions::new()
            .max_connections(1)
            .connect(&self.config.url)
            .await
    }

    /// Opens a connection, pings the database, and closes it again.
    pub async fn verify_connection(&self) -> VerificationResult {
        let pool = match self.open().await {
            Ok(pool) => pool,
            Err(err) => return VerificationResult::error("Database connection failed", err),
        };

        let ping = sqlx::query("SELECT 1").execute(&pool).await;
        pool.close().await;

        match ping {
            Ok(_) => VerificationResult::ok("Database connection successful"),
            Err(err) => VerificationResult::error("Database connection failed", err),
        }
    }

    /// Checks that the tenants and users tables exist.
    pub async fn verify_tables(&self) -> VerificationResult {
        match self.table_check().await {
            Ok((tenants, users)) => {
                let all_present = tenants && users;
                VerificationResult {
                    success: all_present,
                    message: if all_present {
                        "All required tables exist"
                    } else {
                        "Missing required tables"
                    }
                    .to_string(),
                    data: Some(json!({ "tenantsTable": tenants, "usersTable": users })),
                    errors: None,
                }
            }
            Err(err) => VerificationResult::error("Failed to verify tables", err),
        }
    }

    async fn table_check(&self) -> Result<(bool, bool), sqlx::Error> {
        let pool = self.open().await?;
        let sql = self
            .config
            .provider
            .sql(self.config.provider.table_exists_sql());

        let result = async {
            let tenants: i64 = sqlx::query(&sql)
                .bind("tenants")
                .fetch_one(&pool)
                .await?
                .try_get("n")?;
            let users: i64 = sqlx::query(&sql)
                .bind("users")
                .fetch_one(&pool)
                .await?
                .try_get("n")?;
            Ok::<_, sqlx::Error>((tenants > 0, users > 0))
        }
        .await;

        pool.close().await;
        result
    }

    /// Looks up one tenant by name.
    pub async fn verify_tenant_data(&self, tenant_name: &str) -> VerificationResult {
        let pool = match self.open().await {
            Ok(pool) => pool,
            Err(err) => return VerificationResult::error("Failed to verify tenant data", err),
        };

        let found = TenantRepo::new(&pool, self.config.provider)
            .find_by_name(tenant_name)
            .await;
        pool.close().await;

        match found {
            Ok(Some(tenant)) => VerificationResult {
                success: true,
                message: format!("Tenant '{tenant_name}' found"),
                data: serde_json::to_value(&tenant).ok(),
                errors: None,
            },
            Ok(None) => VerificationResult::not_found(format!("Tenant '{tenant_name}' not found")),
            Err(err) => VerificationResult::error("Failed to verify tenant data", err),
        }
    }

    /// Looks up one user by email.
    pub async fn verify_user_data(&self, email: &str) -> VerificationResult {
        let pool = match self.open().await {
            Ok(pool) => pool,
            Err(err) => return VerificationResult::error("Failed to verify user data", err),
        };

        let found = UserRepo::new(&pool, self.config.provider)
            .find_by_email(email)
            .await;
        pool.close().await;

        match found {
            Ok(Some(user)) => VerificationResult {
                success: true,
                message: format!("User '{email}' found"),
                data: serde_json::to_value(&user).ok(),
                errors: None,
            },
            Ok(None) => VerificationResult::not_found(format!("User '{email}' not found")),
            Err(err) => VerificationResult::error("Failed to verify user data", err),
        }
    }

    /// Lists every tenant row.
    pub async fn all_tenants(&self) -> VerificationResult {
        let pool = match self.open().await {
            Ok(pool) => pool,
            Err(err) => return VerificationResult::error("Failed to get tenants", err),
        };

        let listed = TenantRepo::new(&pool, self.config.provider).list().await;
        pool.close().await;

        match listed {
            Ok(tenants) => VerificationResult::ok_with(
                format!("Found {} tenants", tenants.len()),
                serde_json::to_value(&tenants).unwrap_or(serde_json::Value::Null),
            ),
            Err(err) => VerificationResult::error("Failed to get tenants", err),
        }
    }

    /// Lists every user row.
    pub async fn all_users(&self) -> VerificationResult {
        let pool = match self.open().await {
            Ok(pool) => pool,
            Err(err) => return VerificationResult::error("Failed to get users", err),
        };

        let listed = UserRepo::new(&pool, self.config.provider).list().await;
        pool.close().await;

        match listed {
            Ok(users) => VerificationResult::ok_with(
                format!("Found {} users", users.len()),
                serde_json::to_value(&users).unwrap_or(serde_json::Value::Null),
            ),
            Err(err) => VerificationResult::error("Failed to get users", err),
        }
    }

    /// Runs the full check sequence.
    ///
    /// Checks skipped for lack of an optional parameter are absent from the
    /// result list, not counted as failures. A failed connectivity check
    /// skips every check that needs a live connection.
    pub async fn run_full_verification(
        &self,
        tenant_name: Option<&str>,
        user_email: Option<&str>,
    ) -> VerificationResult {
        let mut results: Vec<CheckResult> = Vec::new();

        let connection = self.verify_connection().await;
        let connected = connection.success;
        results.push(CheckResult {
            test: "Connection",
            result: connection,
        });

        if connected {
            results.push(CheckResult {
                test: "Tables",
                result: self.verify_tables().await,
            });

            if let Some(name) = tenant_name {
                results.push(CheckResult {
                    test: "Tenant Data",
                    result: self.verify_tenant_data(name).await,
                });
            }

            if let Some(email) = user_email {
                results.push(CheckResult {
                    test: "User Data",
                    result: self.verify_user_data(email).await,
                });
            }

            results.push(CheckResult {
                test: "All Tenants",
                result: self.all_tenants().await,
            });
            results.push(CheckResult {
                test: "All Users",
                result: self.all_users().await,
            });
        }

        let success = results.iter().all(|check| check.result.success);
        VerificationResult {
            success,
            message: if success {
                "All verification tests passed"
            } else {
                "Some verification tests failed"
            }
            .to_string(),
            data: serde_json::to_value(&results).ok(),
            errors: None,
        }
    }
}
