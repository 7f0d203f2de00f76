//! # gate-core
//!
//! Core types and pure helpers for Gatehouse.
//!
//! This crate provides the foundational types shared across all Gatehouse crates:
//! - The user profile returned by the identity provider (permissions,
//!   organizations, roles)
//! - Projection helpers deriving username, permission keys and tenant
//! - Cross-cutting validation error type
//!
//! Nothing here performs I/O.

pub mod errors;
pub mod profile;
pub mod projections;

pub use errors::CoreError;
pub use profile::{Organization, Permission, Role, UserProfile};
pub use projections::{NO_TENANT, permissions_for, tenant_for, username_of};
