//! Error types for iceflash-core

use std::time::Duration;

use thiserror::Error;

/// Result type for flash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by flash operations
///
/// Errors are never retried by the core. A program or erase that fails
/// part way leaves the flash partially modified.
#[derive(Debug, Error)]
pub enum Error {
    /// Bus transaction failed
    #[error("SPI transfer failed: {0}")]
    Transfer(String),

    /// Chip-select line could not be driven
    #[error("chip select failed: {0}")]
    ChipSelect(String),

    /// One-time bus platform initialization failed
    #[error("platform initialization failed: {0}")]
    Platform(String),

    /// Frame does not fit in a single bus transaction
    #[error("transaction of {len} bytes exceeds the transport limit of {max} bytes")]
    TransactionTooLarge {
        /// Requested frame length
        len: usize,
        /// Largest frame the transport accepts
        max: usize,
    },

    /// Range falls outside the 24-bit address space
    #[error("range 0x{addr:X}+0x{len:X} is outside the 24-bit address space")]
    AddressOutOfRange {
        /// Start address of the range
        addr: u32,
        /// Length of the range in bytes
        len: usize,
    },

    /// Page program payload is empty or larger than a page
    #[error("page program payload of {0} bytes (must be 1..=256)")]
    PageOverflow(usize),

    /// Device stayed busy past the wait timeout
    #[error("flash still busy after {waited:?}")]
    Timeout {
        /// Time spent waiting
        waited: Duration,
    },

    /// Reading the program input failed
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from the bus or chip-select line
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transfer(_)
                | Error::ChipSelect(_)
                | Error::Platform(_)
                | Error::TransactionTooLarge { .. }
        )
    }

    /// Whether this error is an address or size validation failure
    pub fn is_range(&self) -> bool {
        matches!(self, Error::AddressOutOfRange { .. } | Error::PageOverflow(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::Transfer("usb".into()).is_transport());
        assert!(Error::ChipSelect("gpio".into()).is_transport());
        assert!(!Error::Transfer("usb".into()).is_range());
        assert!(Error::PageOverflow(300).is_range());
        assert!(Error::AddressOutOfRange { addr: 0xFFFFFF, len: 2 }.is_range());
        let timeout = Error::Timeout {
            waited: Duration::from_secs(1),
        };
        assert!(!timeout.is_range() && !timeout.is_transport());
    }

    #[test]
    fn test_display() {
        let e = Error::AddressOutOfRange {
            addr: 0xFFFF00,
            len: 0x200,
        };
        assert_eq!(
            e.to_string(),
            "range 0xFFFF00+0x200 is outside the 24-bit address space"
        );
        assert_eq!(
            Error::PageOverflow(257).to_string(),
            "page program payload of 257 bytes (must be 1..=256)"
        );
    }
}
