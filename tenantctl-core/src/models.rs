//! Tenant and user records as they cross the wire.
//!
//! Field casing follows the HTTP contract (`createdAt`), not Rust convention.

use serde::{Deserialize, Serialize};

/// A provisioned tenant row.
///
/// `name` carries no uniqueness constraint; lookups by name return an
/// arbitrary row among duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// A user row. Email is unique per database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_serializes_camel_case() {
        let tenant = Tenant {
            id: 1,
            name: "Acme".into(),
            created_at: "2024-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&tenant).unwrap();
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00+00:00");
        assert!(json.get("created_at").is_none());
    }
}
