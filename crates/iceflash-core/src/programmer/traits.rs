//! Transport trait definitions

use std::time::{Duration, Instant};

use crate::error::Result;

/// Largest single bus transaction an MPSSE engine accepts (FTDI AN_108)
pub const MAX_TRANSACTION_LEN: usize = 65536;

/// Level of the chip-select line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipSelect {
    /// Line driven low, device selected
    Asserted,
    /// Line driven high, device idle
    Deasserted,
}

/// Full-duplex SPI transport
///
/// Implementations execute raw byte exchanges and drive the chip-select
/// line; framing, chunking and readiness polling are handled by the core.
///
/// ## Example: in-memory transport
///
/// ```ignore
/// impl SpiTransport for Loopback {
///     fn transfer(&mut self, buf: &mut [u8]) -> Result<()> {
///         // echo what was sent
///         Ok(())
///     }
///
///     fn set_chip_select(&mut self, _level: ChipSelect) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait SpiTransport {
    /// Maximum number of bytes exchanged in a single transfer
    fn max_transaction_len(&self) -> usize {
        MAX_TRANSACTION_LEN
    }

    /// Exchange `buf` with the device
    ///
    /// The bytes in `buf` are clocked out and replaced in place by the
    /// bytes clocked in, so the response always has the frame's length.
    fn transfer(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Drive the chip-select line
    fn set_chip_select(&mut self, level: ChipSelect) -> Result<()>;

    /// Block for the given duration
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Monotonic clock used for wait timeouts
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn max_transaction_len(&self) -> usize {
        (**self).max_transaction_len()
    }

    fn transfer(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).transfer(buf)
    }

    fn set_chip_select(&mut self, level: ChipSelect) -> Result<()> {
        (**self).set_chip_select(level)
    }

    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }

    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<T: SpiTransport + ?Sized> SpiTransport for Box<T> {
    fn max_transaction_len(&self) -> usize {
        (**self).max_transaction_len()
    }

    fn transfer(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).transfer(buf)
    }

    fn set_chip_select(&mut self, level: ChipSelect) -> Result<()> {
        (**self).set_chip_select(level)
    }

    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }

    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Control over the FPGA sharing the flash's SPI bus
///
/// While the FPGA is out of reset it may act as SPI master and read its
/// bitstream, so it must be held in reset before the flash is modified.
pub trait FpgaControl {
    /// Hold the FPGA in reset (`true`) or let it configure (`false`)
    fn hold_reset(&mut self, hold: bool) -> Result<()>;

    /// Level of the FPGA's configuration-done line, if it can be read
    fn config_done(&mut self) -> Result<Option<bool>> {
        Ok(None)
    }
}

impl<T: FpgaControl + ?Sized> FpgaControl for &mut T {
    fn hold_reset(&mut self, hold: bool) -> Result<()> {
        (**self).hold_reset(hold)
    }

    fn config_done(&mut self) -> Result<Option<bool>> {
        (**self).config_done()
    }
}

impl<T: FpgaControl + ?Sized> FpgaControl for Box<T> {
    fn hold_reset(&mut self, hold: bool) -> Result<()> {
        (**self).hold_reset(hold)
    }

    fn config_done(&mut self) -> Result<Option<bool>> {
        (**self).config_done()
    }
}

/// An FPGA board: flash transport plus FPGA reset control
pub trait Board: SpiTransport + FpgaControl {}

impl<T: SpiTransport + FpgaControl + ?Sized> Board for T {}
