//! Tenant repository.

use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

use tenantctl_core::{time, Provider, Tenant};

use super::DbError;

/// Tenant record access over a borrowed handle.
pub struct TenantRepo<'a> {
    pool: &'a AnyPool,
    provider: Provider,
}

impl<'a> TenantRepo<'a> {
    pub fn new(pool: &'a AnyPool, provider: Provider) -> Self {
        Self { pool, provider }
    }

    /// Inserts a tenant and returns the stored row.
    pub async fn create(&self, name: &str) -> Result<Tenant, DbError> {
        let id = if self.provider.supports_returning() {
            let row = sqlx::query("INSERT INTO tenants (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(self.pool)
                .await?;
            row.try_get::<i64, _>("id")?
        } else {
            // MySQL: LAST_INSERT_ID() is per-connection, so pin one.
            let mut conn = self.pool.acquire().await?;
            let sql = self.provider.sql("INSERT INTO tenants (name) VALUES ($1)");
            sqlx::query(&sql).bind(name).execute(&mut *conn).await?;
            sqlx::query("SELECT CAST(LAST_INSERT_ID() AS SIGNED) AS id")
                .fetch_one(&mut *conn)
                .await?
                .try_get::<i64, _>("id")?
        };

        self.find_by_id(id)
            .await?
            .ok_or(DbError::MissingAfterInsert { resource: "tenant" })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tenant>, DbError> {
        let sql = format!(
            "SELECT id, name, {} AS created_at FROM tenants WHERE id = $1",
            self.provider.created_at_expr()
        );
        let sql = self.provider.sql(&sql);
        let row = sqlx::query(&sql).bind(id).fetch_optional(self.pool).await?;

        match row {
            Some(row) => Ok(Some(tenant_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Finds one tenant by name. `name` carries no uniqueness constraint, so
    /// among duplicates the match is arbitrary.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tenant>, DbError> {
        let sql = format!(
            "SELECT id, name, {} AS created_at FROM tenants WHERE name = $1 LIMIT 1",
            self.provider.created_at_expr()
        );
        let sql = self.provider.sql(&sql);
        let row = sqlx::query(&sql).bind(name).fetch_optional(self.pool).await?;

        match row {
            Some(row) => Ok(Some(tenant_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Lists every tenant, oldest first.
    pub async fn list(&self) -> Result<Vec<Tenant>, DbError> {
        let sql = format!(
            "SELECT id, name, {} AS created_at FROM tenants ORDER BY id",
            self.provider.created_at_expr()
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool).await?;

        rows.iter()
            .map(|row| tenant_from_row(row).map_err(DbError::from))
            .collect()
    }
}

fn tenant_from_row(row: &AnyRow) -> Result<Tenant, sqlx::Error> {
    Ok(Tenant {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: time::to_rfc3339(&row.try_get::<String, _>("created_at")?),
    })
}
