//! Error types for flatstore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FlatError
pub type Result<T> = std::result::Result<T, FlatError>;

/// Unified error type for flatstore operations
#[derive(Debug, Error)]
pub enum FlatError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Write failed: {0}")]
    Write(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
