//! 24-bit flash addresses

use std::fmt;

use crate::error::{Error, Result};

/// A flash address, constrained to the 24-bit space (0..=0xFFFFFF)
///
/// Values above the limit are rejected rather than wrapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u32);

impl Address {
    /// Highest addressable byte
    pub const MAX: u32 = 0x00FF_FFFF;
    /// Size of the whole address space in bytes (16 MiB)
    pub const SPACE: usize = 1 << 24;

    /// Create an address, failing if it does not fit in 24 bits
    pub fn new(addr: u32) -> Result<Self> {
        if addr > Self::MAX {
            return Err(Error::AddressOutOfRange { addr, len: 0 });
        }
        Ok(Address(addr))
    }

    /// Validate that `[addr, addr + len)` lies within the address space
    /// and return the start address
    pub fn range(addr: u32, len: usize) -> Result<Self> {
        let end = (addr as usize).checked_add(len);
        match end {
            Some(end) if addr <= Self::MAX && end <= Self::SPACE => Ok(Address(addr)),
            _ => Err(Error::AddressOutOfRange { addr, len }),
        }
    }

    /// Raw address value
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Big-endian 3-byte encoding as sent on the wire
    pub const fn to_be_bytes(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Address `offset` bytes further on, if still in range
    pub fn offset(self, offset: usize) -> Result<Self> {
        let next = (self.0 as usize)
            .checked_add(offset)
            .filter(|&a| a <= Self::MAX as usize)
            .ok_or(Error::AddressOutOfRange {
                addr: self.0,
                len: offset,
            })?;
        Ok(Address(next as u32))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}
