//! HTTP route modules.

pub mod health;
pub mod provision;
pub mod tenants;
pub mod verify;
