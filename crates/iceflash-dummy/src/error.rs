//! Error types for the dummy programmer

use thiserror::Error;

/// Errors configuring the emulated flash
#[derive(Debug, Error)]
pub enum DummyError {
    /// Invalid option value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Initial image could not be loaded
    #[error("failed to load image: {0}")]
    Image(#[from] std::io::Error),
}

/// Result type for dummy configuration
pub type Result<T> = std::result::Result<T, DummyError>;
