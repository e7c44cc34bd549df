//! Chip-select bracketing

use super::traits::{ChipSelect, SpiTransport};
use crate::error::{Error, Result};

/// An asserted chip-select line
///
/// The line is deasserted by [`release`](Self::release), or on drop if the
/// guard goes out of scope early (error return or panic).
pub struct ChipSelectGuard<'a, T: SpiTransport + ?Sized> {
    bus: &'a mut T,
    released: bool,
}

impl<'a, T: SpiTransport + ?Sized> ChipSelectGuard<'a, T> {
    /// Assert chip select on `bus`
    pub fn assert(bus: &'a mut T) -> Result<Self> {
        bus.set_chip_select(ChipSelect::Asserted)?;
        Ok(ChipSelectGuard {
            bus,
            released: false,
        })
    }

    /// Exchange `buf` with the selected device
    pub fn transfer(&mut self, buf: &mut [u8]) -> Result<()> {
        self.bus.transfer(buf)
    }

    /// Deassert chip select, reporting a failure to do so
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.bus.set_chip_select(ChipSelect::Deasserted)
    }
}

impl<T: SpiTransport + ?Sized> Drop for ChipSelectGuard<'_, T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.bus.set_chip_select(ChipSelect::Deasserted) {
            log::warn!("Failed to deassert chip select: {}", e);
        }
    }
}

/// Run one full-duplex transaction under chip select
///
/// Chip select is deasserted even when the transfer fails; a deassert
/// failure is only returned when the transfer itself succeeded.
pub fn transact<T: SpiTransport + ?Sized>(bus: &mut T, buf: &mut [u8]) -> Result<()> {
    let max = bus.max_transaction_len();
    if buf.len() > max {
        return Err(Error::TransactionTooLarge {
            len: buf.len(),
            max,
        });
    }

    let mut cs = ChipSelectGuard::assert(bus)?;
    let result = cs.transfer(buf);
    let released = cs.release();
    result.and(released)
}
