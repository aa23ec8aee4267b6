//! Database providers and their SQL dialects.
//!
//! The provider drives dialect decisions (DDL, placeholder style, catalog
//! queries); the connection URL scheme drives driver selection. Queries in
//! this workspace are written with `$1`-style placeholders, which Postgres
//! and SQLite accept natively; MySQL queries are rewritten to `?` via
//! [`Provider::sql`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Database backend a tenant connection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "postgresql")]
    Postgres,
    Mysql,
    Sqlite,
}

/// Error returned when a provider string is not one of the supported names.
#[derive(Debug, Clone, Error)]
#[error("unsupported provider '{0}'; expected postgresql, mysql, or sqlite")]
pub struct ParseProviderError(pub String);

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Postgres => "postgresql",
            Provider::Mysql => "mysql",
            Provider::Sqlite => "sqlite",
        }
    }

    /// Statements that create the provisioning schema for this backend.
    ///
    /// Every dialect uses `IF NOT EXISTS`, so reapplying is a no-op.
    pub fn schema_sql(&self) -> [&'static str; 2] {
        match self {
            Provider::Postgres => [
                r#"
                CREATE TABLE IF NOT EXISTS tenants (
                    id BIGSERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id BIGSERIAL PRIMARY KEY,
                    email VARCHAR(255) NOT NULL UNIQUE,
                    name VARCHAR(255) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ],
            Provider::Mysql => [
                r#"
                CREATE TABLE IF NOT EXISTS tenants (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    email VARCHAR(255) NOT NULL UNIQUE,
                    name VARCHAR(255) NOT NULL,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
                "#,
            ],
            Provider::Sqlite => [
                r#"
                CREATE TABLE IF NOT EXISTS tenants (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
                "#,
            ],
        }
    }

    /// Catalog query counting tables with the bound name.
    ///
    /// Returns a single BIGINT column so all three backends decode uniformly.
    pub fn table_exists_sql(&self) -> &'static str {
        match self {
            Provider::Postgres => {
                "SELECT COUNT(*) AS n FROM information_schema.tables WHERE table_name = $1"
            }
            Provider::Mysql => {
                "SELECT COUNT(*) AS n FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = $1"
            }
            Provider::Sqlite => {
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = $1"
            }
        }
    }

    /// Select expression rendering `created_at` as text for this backend.
    pub fn created_at_expr(&self) -> &'static str {
        match self {
            Provider::Postgres => "created_at::text",
            Provider::Mysql => "CAST(created_at AS CHAR)",
            Provider::Sqlite => "created_at",
        }
    }

    /// Whether `INSERT ... RETURNING` is available.
    pub fn supports_returning(&self) -> bool {
        !matches!(self, Provider::Mysql)
    }

    /// Adapts a `$1`-style query to this backend's placeholder syntax.
    pub fn sql<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        match self {
            Provider::Mysql => rewrite_dollar_placeholders(sql),
            _ => Cow::Borrowed(sql),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgresql" => Ok(Provider::Postgres),
            "mysql" => Ok(Provider::Mysql),
            "sqlite" => Ok(Provider::Sqlite),
            other => Err(ParseProviderError(other.to_string())),
        }
    }
}

/// Replaces `$1`-style placeholders with `?`.
///
/// Assumes placeholders appear in ascending bind order, which holds for every
/// query in this workspace.
fn rewrite_dollar_placeholders(sql: &str) -> Cow<'_, str> {
    if !sql.contains('$') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' && chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                chars.next();
            }
            out.push('?');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_providers() {
        assert_eq!("postgresql".parse::<Provider>().unwrap(), Provider::Postgres);
        assert_eq!("mysql".parse::<Provider>().unwrap(), Provider::Mysql);
        assert_eq!("sqlite".parse::<Provider>().unwrap(), Provider::Sqlite);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = "oracle".parse::<Provider>().unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn serde_round_trip_uses_wire_names() {
        let json = serde_json::to_string(&Provider::Postgres).unwrap();
        assert_eq!(json, "\"postgresql\"");
        let back: Provider = serde_json::from_str("\"sqlite\"").unwrap();
        assert_eq!(back, Provider::Sqlite);
    }

    #[test]
    fn mysql_placeholders_rewritten() {
        let sql = Provider::Mysql.sql("INSERT INTO users (email, name) VALUES ($1, $2)");
        assert_eq!(sql, "INSERT INTO users (email, name) VALUES (?, ?)");
    }

    #[test]
    fn multi_digit_placeholders_rewritten() {
        let sql = Provider::Mysql.sql("SELECT $1, $2, $10 WHERE x = $11");
        assert_eq!(sql, "SELECT ?, ?, ? WHERE x = ?");
    }

    #[test]
    fn postgres_and_sqlite_queries_untouched() {
        let q = "SELECT id FROM tenants WHERE name = $1";
        assert_eq!(Provider::Postgres.sql(q), q);
        assert_eq!(Provider::Sqlite.sql(q), q);
    }

    #[test]
    fn dollar_without_digit_preserved() {
        let q = "SELECT '$notaplaceholder' WHERE a = $1";
        assert_eq!(Provider::Mysql.sql(q), "SELECT '$notaplaceholder' WHERE a = ?");
    }

    #[test]
    fn schema_is_two_statements_per_backend() {
        for provider in [Provider::Postgres, Provider::Mysql, Provider::Sqlite] {
            let [tenants, users] = provider.schema_sql();
            assert!(tenants.contains("IF NOT EXISTS tenants"));
            assert!(users.contains("IF NOT EXISTS users"));
        }
    }
}
