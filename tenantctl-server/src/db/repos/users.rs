//! User repository.

use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

use tenantctl_core::{time, Provider, User};

use super::DbError;

/// User record access over a borrowed handle.
pub struct UserRepo<'a> {
    pool: &'a AnyPool,
    provider: Provider,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a AnyPool, provider: Provider) -> Self {
        Self { pool, provider }
    }

    /// Inserts a user and returns the stored row.
    ///
    /// A duplicate email surfaces as [`DbError::UniqueViolation`].
    pub async fn create(&self, email: &str, name: &str) -> Result<User, DbError> {
        let id = if self.provider.supports_returning() {
            let row = sqlx::query("INSERT INTO users (email, name) VALUES ($1, $2) RETURNING id")
                .bind(email)
                .bind(name)
                .fetch_one(self.pool)
                .await
                .map_err(|err| DbError::from_insert(err, "email", email))?;
            row.try_get::<i64, _>("id")?
        } else {
            // MySQL: LAST_INSERT_ID() is per-connection, so pin one.
            let mut conn = self.pool.acquire().await?;
            let sql = self
                .provider
                .sql("INSERT INTO users (email, name) VALUES ($1, $2)");
            sqlx::query(&sql)
                .bind(email)
                .bind(name)
                .execute(&mut *conn)
                .await
                .map_err(|err| DbError::from_insert(err, "email", email))?;
            sqlx::query("SELECT CAST(LAST_INSERT_ID() AS SIGNED) AS id")
                .fetch_one(&mut *conn)
                .await?
                .try_get::<i64, _>("id")?
        };

        self.find_by_id(id)
            .await?
            .ok_or(DbError::MissingAfterInsert { resource: "user" })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let sql = format!(
            "SELECT id, email, name, {} AS created_at FROM users WHERE id = $1",
            self.provider.created_at_expr()
        );
        let sql = self.provider.sql(&sql);
        let row = sqlx::query(&sql).bind(id).fetch_optional(self.pool).await?;

        match row {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Finds one user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let sql = format!(
            "SELECT id, email, name, {} AS created_at FROM users WHERE email = $1",
            self.provider.created_at_expr()
        );
        let sql = self.provider.sql(&sql);
        let row = sqlx::query(&sql).bind(email).fetch_optional(self.pool).await?;

        match row {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Lists every user, oldest first.
    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let sql = format!(
            "SELECT id, email, name, {} AS created_at FROM users ORDER BY id",
            self.provider.created_at_expr()
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool).await?;

        rows.iter()
            .map(|row| user_from_row(row).map_err(DbError::from))
            .collect()
    }
}

fn user_from_row(row: &AnyRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        created_at: time::to_rfc3339(&row.try_get::<String, _>("created_at")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::{migrate, testing};

    #[tokio::test]
    async fn create_then_find_by_email() {
        let (_dir, config) = testing::sqlite_config();
        migrate::run(&config).await.unwrap();
        let pool = testing::sqlite_pool(&config).await;
        let repo = UserRepo::new(&pool, config.provider);

        let created = repo.create("ada@acme.test", "Ada").await.unwrap();
        assert_eq!(created.id, 1);

        let found = repo.find_by_email("ada@acme.test").await.unwrap().unwrap();
        assert_eq!(found.name, "Ada");
        assert_eq!(found.id, created.id);
        pool.close().await;
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let (_dir, config) = testing::sqlite_config();
        migrate::run(&config).await.unwrap();
        let pool = testing::sqlite_pool(&config).await;
        let repo = UserRepo::new(&pool, config.provider);

        repo.create("ada@acme.test", "Ada").await.unwrap();
        let err = repo.create("ada@acme.test", "Imposter").await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { column: "email", .. }));
        assert!(err.to_string().contains("ada@acme.test"));

        // The failed insert must not have left a second row behind.
        assert_eq!(repo.list().await.unwrap().len(), 1);
        pool.close().await;
    }

    #[tokio::test]
    async fn find_by_email_misses_cleanly() {
        let (_dir, config) = testing::sqlite_config();
        migrate::run(&config).await.unwrap();
        let pool = testing::sqlite_pool(&config).await;
        let repo = UserRepo::new(&pool, config.provider);

        assert!(repo.find_by_email("ghost@acme.test").await.unwrap().is_none());
        pool.close().await;
    }
}
