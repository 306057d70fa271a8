//! Domain logic for the toolbox save service.
//!
//! This crate has zero internal dependencies so that the persistence and
//! API layers can both reference the same lock state machine, capability
//! rules, and error taxonomy without pulling in sqlx or axum.

pub mod authorize;
pub mod error;
pub mod locking;
pub mod roles;
pub mod types;
