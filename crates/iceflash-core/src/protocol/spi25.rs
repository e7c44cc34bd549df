//! Command execution for 25-series SPI flash

use crate::chip::FlashIdentity;
use crate::error::{Error, Result};
use crate::programmer::{transact, SpiTransport};
use crate::spi::{Address, Command, StatusRegister, ADDRESSED_HEADER_LEN};

use super::poll::{wait_ready, Wait};

/// Encode `cmd`, exchange it under chip select and return the whole
/// exchanged frame
pub fn execute<T: SpiTransport + ?Sized>(bus: &mut T, cmd: &Command<'_>) -> Result<Vec<u8>> {
    let mut frame = cmd.encode()?;
    log::trace!(
        "{} ({} bytes): {:02X?}",
        cmd.name(),
        frame.len(),
        &frame[..frame.len().min(8)]
    );
    transact(bus, &mut frame)?;
    Ok(frame)
}

/// Release the chip from deep power-down
pub fn power_up<T: SpiTransport + ?Sized>(bus: &mut T) -> Result<()> {
    execute(bus, &Command::PowerUp).map(drop)
}

/// Put the chip into deep power-down
pub fn power_down<T: SpiTransport + ?Sized>(bus: &mut T) -> Result<()> {
    execute(bus, &Command::PowerDown).map(drop)
}

/// Read the JEDEC identity (RDID)
pub fn read_jedec_id<T: SpiTransport + ?Sized>(bus: &mut T) -> Result<FlashIdentity> {
    let frame = execute(bus, &Command::ReadId)?;
    Ok(FlashIdentity([frame[1], frame[2], frame[3]]))
}

/// Read the status register (RDSR)
pub fn read_status<T: SpiTransport + ?Sized>(bus: &mut T) -> Result<StatusRegister> {
    let frame = execute(bus, &Command::ReadStatus)?;
    Ok(StatusRegister::from_byte(frame[1]))
}

/// Set the write-enable latch (WREN)
pub fn write_enable<T: SpiTransport + ?Sized>(bus: &mut T) -> Result<()> {
    execute(bus, &Command::WriteEnable).map(drop)
}

/// Fill `buf` with flash contents starting at `addr`
///
/// The read is split into as many READ transactions as the transport's
/// transaction limit requires. Each chunk is addressed absolutely and the
/// chunks are stored back to back in issue order.
pub fn read<T: SpiTransport + ?Sized>(bus: &mut T, addr: u32, buf: &mut [u8]) -> Result<()> {
    let start = Address::range(addr, buf.len())?;
    let max = bus.max_transaction_len();
    let max_data = max.saturating_sub(ADDRESSED_HEADER_LEN);
    if max_data == 0 {
        return Err(Error::TransactionTooLarge {
            len: ADDRESSED_HEADER_LEN + 1,
            max,
        });
    }

    let mut offset = 0;
    for chunk in buf.chunks_mut(max_data) {
        let address = start.offset(offset)?;
        log::debug!("Reading {} bytes at {}", chunk.len(), address);
        let frame = execute(
            bus,
            &Command::Read {
                address,
                len: chunk.len(),
            },
        )?;
        chunk.copy_from_slice(&frame[ADDRESSED_HEADER_LEN..]);
        offset += chunk.len();
    }
    Ok(())
}

/// Program one page-bounded piece and wait for the cycle to finish
///
/// Sends WREN, then PP, then polls until the device is idle.
pub fn page_program<T: SpiTransport + ?Sized>(
    bus: &mut T,
    addr: u32,
    data: &[u8],
    wait: Wait,
) -> Result<()> {
    let address = Address::range(addr, data.len())?;
    write_enable(bus)?;
    execute(bus, &Command::PageProgram { address, data })?;
    wait_ready(bus, wait)
}

/// Issue an addressed erase command and wait for the cycle to finish
///
/// `cmd` must be one of the addressed erase commands.
pub fn erase_block<T: SpiTransport + ?Sized>(
    bus: &mut T,
    cmd: &Command<'_>,
    wait: Wait,
) -> Result<()> {
    write_enable(bus)?;
    execute(bus, cmd)?;
    wait_ready(bus, wait)
}

/// Erase the whole chip and wait for the cycle to finish
pub fn chip_erase<T: SpiTransport + ?Sized>(bus: &mut T, wait: Wait) -> Result<()> {
    write_enable(bus)?;
    execute(bus, &Command::EraseChip)?;
    wait_ready(bus, wait)
}
