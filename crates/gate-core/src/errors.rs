//! Cross-cutting error types for Gatehouse.
//!
//! Transport and session errors live in `gate-auth`; this module only covers
//! failures of the pure helpers in this crate.

use thiserror::Error;

/// Errors raised by the projection helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Input was structurally invalid (missing profile, missing namespace, wrong field type).
    #[error("Validation error: {0}")]
    Validation(String),
}
