//! Core Error Types
//!
//! Defines the foundational error types used across the Review Coach
//! workspace. These error types are dependency-free (only thiserror) to keep
//! the core crate lightweight.
//!
//! The main application crate extends these with transport-level variants
//! (e.g. HTTP status errors, cancellation) that require heavier dependencies.

use thiserror::Error;

/// Core error type for the Review Coach workspace.
///
/// This is the minimal error set that the core crate needs. The application
/// crate defines additional variants for the remote profile store.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
