//! Error types for the FTDI transport

use thiserror::Error;

/// Result type for FTDI operations
pub type Result<T> = std::result::Result<T, FtdiError>;

/// Errors that can occur during FTDI operations
#[derive(Debug, Error)]
pub enum FtdiError {
    /// Failed to open device
    #[error("failed to open device: {0}")]
    OpenFailed(String),

    /// USB transfer failed
    #[error("USB transfer failed: {0}")]
    TransferFailed(String),

    /// Failed to configure device
    #[error("failed to configure device: {0}")]
    ConfigFailed(String),

    /// Invalid channel/port specification
    #[error("invalid channel: {0}")]
    InvalidChannel(String),

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// libftdi error
    #[error("libftdi error: {0}")]
    LibFtdi(#[from] ftdi::Error),
}
