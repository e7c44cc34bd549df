//! Erase planning

use std::ops::Range;

use crate::error::Result;
use crate::spi::{Address, Command};

/// Subsector size (4 KiB)
pub const SUBSECTOR_SIZE: usize = 4 << 10;
/// Sector size (64 KiB)
pub const SECTOR_SIZE: usize = 64 << 10;

/// Size of a single erase command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EraseGranularity {
    /// 4 KiB subsector erase
    Subsector4K,
    /// 64 KiB sector erase
    Sector64K,
}

impl EraseGranularity {
    /// Bytes erased by one command
    pub const fn size(self) -> usize {
        match self {
            EraseGranularity::Subsector4K => SUBSECTOR_SIZE,
            EraseGranularity::Sector64K => SECTOR_SIZE,
        }
    }
}

/// One erase command of a plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EraseStep {
    /// Command size
    pub granularity: EraseGranularity,
    /// Absolute start address
    pub address: Address,
}

impl EraseStep {
    /// The command implementing this step
    pub const fn command(&self) -> Command<'static> {
        match self.granularity {
            EraseGranularity::Subsector4K => Command::Erase4K(self.address),
            EraseGranularity::Sector64K => Command::Erase64K(self.address),
        }
    }

    /// Byte range this step nominally covers
    pub fn range(&self) -> Range<usize> {
        let start = self.address.get() as usize;
        start..start + self.granularity.size()
    }

    /// Whether the address sits on the granularity's boundary
    ///
    /// The device erases the whole aligned block containing the address,
    /// so a misaligned step also clears bytes before `address`.
    pub fn is_aligned(&self) -> bool {
        self.address.get() as usize % self.granularity.size() == 0
    }
}

/// Erase steps covering `[base, base + size)`
///
/// 64 KiB steps are taken while at least 64 KiB remains, then 4 KiB steps
/// cover the rest, the last one rounding up. Step addresses advance from
/// `base` by the size of each step; alignment is not adjusted.
#[derive(Clone, Debug)]
pub struct ErasePlan {
    next: u32,
    remaining: usize,
}

impl ErasePlan {
    /// Plan an erase, failing if the range leaves the 24-bit space
    pub fn new(base: u32, size: usize) -> Result<Self> {
        Address::range(base, size)?;
        Ok(ErasePlan {
            next: base,
            remaining: size,
        })
    }

    /// Bytes the remaining steps erase, including the rounded-up tail
    pub fn erase_len(&self) -> usize {
        let sectors = self.remaining / SECTOR_SIZE;
        let subsectors = (self.remaining % SECTOR_SIZE).div_ceil(SUBSECTOR_SIZE);
        sectors * SECTOR_SIZE + subsectors * SUBSECTOR_SIZE
    }
}

impl Iterator for ErasePlan {
    type Item = EraseStep;

    fn next(&mut self) -> Option<EraseStep> {
        if self.remaining == 0 {
            return None;
        }
        let granularity = if self.remaining >= SECTOR_SIZE {
            EraseGranularity::Sector64K
        } else {
            EraseGranularity::Subsector4K
        };
        // every step starts below base + size, which new() checked
        let address = Address::new(self.next).ok()?;
        let size = granularity.size();
        self.next += size as u32;
        self.remaining = self.remaining.saturating_sub(size);
        Some(EraseStep {
            granularity,
            address,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining / SECTOR_SIZE
            + (self.remaining % SECTOR_SIZE).div_ceil(SUBSECTOR_SIZE);
        (n, Some(n))
    }
}

impl ExactSizeIterator for ErasePlan {}
