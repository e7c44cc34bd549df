//! Flash session controller

use std::io::{self, Read};
use std::time::Duration;

use super::erase::{EraseGranularity, ErasePlan};
use super::progress::{NoProgress, Progress};
use crate::chip::{Chip, FlashIdentity, TimingProfile};
use crate::error::{Error, Result};
use crate::programmer::SpiTransport;
use crate::protocol::{spi25, wait_ready, Wait};
use crate::spi::{Address, StatusRegister, ADDRESSED_HEADER_LEN, PAGE_SIZE};

/// Status poll interval while a page program is running
pub const PROGRAM_POLL: Duration = Duration::from_micros(100);
/// Status poll interval while a 4 KiB erase is running
pub const ERASE_4K_POLL: Duration = Duration::from_millis(50);
/// Status poll interval while a 64 KiB erase is running
pub const ERASE_64K_POLL: Duration = Duration::from_millis(100);
/// Status poll interval while a chip erase is running
pub const ERASE_CHIP_POLL: Duration = Duration::from_secs(1);

/// Waits give up after this multiple of the worst-case cycle time
const TIMEOUT_MARGIN: u32 = 2;

/// Approximate span between read progress reports
const READ_BLOCK: usize = 64 << 10;

/// Sequences flash operations over an exclusively owned transport
///
/// The identity read by [`identify`](Self::identify) is kept for the
/// session; timing is re-derived from it on every use. Before
/// identification the conservative profile applies.
pub struct FlashController<T: SpiTransport> {
    bus: T,
    chip: Option<Chip>,
}

impl<T: SpiTransport> FlashController<T> {
    /// Take ownership of a transport
    pub fn new(bus: T) -> Self {
        FlashController { bus, chip: None }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.bus
    }

    /// Mutable access to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.bus
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.bus
    }

    /// The chip resolved by the last [`identify`](Self::identify)
    pub fn chip(&self) -> Option<Chip> {
        self.chip
    }

    /// Timing for the identified chip, or the conservative fallback
    pub fn timing(&self) -> TimingProfile {
        match self.chip {
            Some(chip) => chip.timing(),
            None => TimingProfile::conservative(),
        }
    }

    fn wait(interval: Duration, worst_case: Duration) -> Wait {
        Wait::new(interval, worst_case * TIMEOUT_MARGIN)
    }

    /// Release the chip from deep power-down and wait tRES1
    pub fn power_up(&mut self) -> Result<()> {
        log::debug!("Releasing flash from power-down");
        spi25::power_up(&mut self.bus)?;
        let settle = self.timing().power_up;
        self.bus.delay(settle);
        Ok(())
    }

    /// Put the chip into deep power-down and wait tDP
    pub fn power_down(&mut self) -> Result<()> {
        log::debug!("Putting flash into power-down");
        spi25::power_down(&mut self.bus)?;
        let settle = self.timing().power_down;
        self.bus.delay(settle);
        Ok(())
    }

    /// Read the JEDEC identity and resolve the chip
    ///
    /// Returns the identity and the chip name, which is empty for unknown
    /// identities. An unknown identity is not an error.
    pub fn identify(&mut self) -> Result<(FlashIdentity, &'static str)> {
        let id = spi25::read_jedec_id(&mut self.bus)?;
        let chip = Chip::resolve(id);
        match chip {
            Chip::Known(known) => log::info!("Found {} (ID {})", known.name(), id),
            Chip::Unknown(_) => {
                log::warn!("Unknown flash ID {}, using conservative timing", id)
            }
        }
        self.chip = Some(chip);
        Ok((id, chip.name()))
    }

    /// Read the status register
    pub fn read_status_register(&mut self) -> Result<StatusRegister> {
        spi25::read_status(&mut self.bus)
    }

    /// Read `len` bytes starting at `addr`
    pub fn read(&mut self, addr: u32, len: usize) -> Result<Vec<u8>> {
        self.read_with_progress(addr, len, &mut NoProgress)
    }

    /// Read `len` bytes starting at `addr`, reporting progress
    pub fn read_with_progress(
        &mut self,
        addr: u32,
        len: usize,
        progress: &mut dyn Progress,
    ) -> Result<Vec<u8>> {
        Address::range(addr, len)?;
        let mut data = vec![0u8; len];
        progress.reading(len);
        let mut done = 0;
        for block in data.chunks_mut(self.read_block()) {
            spi25::read(&mut self.bus, addr + done as u32, block)?;
            done += block.len();
            progress.read_progress(done);
        }
        Ok(data)
    }

    /// Progress block size, a whole number of READ transactions
    ///
    /// Blocks must not split a transaction, or every block would end in a
    /// short extra READ.
    fn read_block(&self) -> usize {
        let max_data = self
            .bus
            .max_transaction_len()
            .saturating_sub(ADDRESSED_HEADER_LEN);
        if max_data == 0 {
            // spi25::read reports the unusable limit
            return READ_BLOCK;
        }
        max_data * (READ_BLOCK / max_data).max(1)
    }

    /// Compare flash contents at `addr` with `expected`
    ///
    /// Returns the address of the first differing byte, if any.
    pub fn verify(&mut self, addr: u32, expected: &[u8]) -> Result<Option<u32>> {
        self.verify_with_progress(addr, expected, &mut NoProgress)
    }

    /// Compare flash contents with `expected`, reporting read progress
    pub fn verify_with_progress(
        &mut self,
        addr: u32,
        expected: &[u8],
        progress: &mut dyn Progress,
    ) -> Result<Option<u32>> {
        let actual = self.read_with_progress(addr, expected.len(), progress)?;
        Ok(actual
            .iter()
            .zip(expected)
            .position(|(a, e)| a != e)
            .map(|i| addr + i as u32))
    }

    /// Program a stream from address 0
    ///
    /// Returns the number of bytes programmed.
    pub fn program<R: Read>(&mut self, input: R) -> Result<usize> {
        self.program_with_progress(0, input, &mut NoProgress)
    }

    /// Program a stream starting at `base`
    pub fn program_at<R: Read>(&mut self, base: u32, input: R) -> Result<usize> {
        self.program_with_progress(base, input, &mut NoProgress)
    }

    /// Program a stream starting at `base`, reporting progress
    ///
    /// The stream is consumed in pieces that never cross a page boundary,
    /// so from an aligned base every piece but the last is a full page.
    /// Each piece is sent as WREN, PP and a wait for the cycle to end.
    pub fn program_with_progress<R: Read>(
        &mut self,
        base: u32,
        mut input: R,
        progress: &mut dyn Progress,
    ) -> Result<usize> {
        Address::new(base)?;
        let wait = Self::wait(PROGRAM_POLL, self.timing().page_program);
        let mut page = [0u8; PAGE_SIZE];
        let mut written = 0usize;

        loop {
            let addr = base as usize + written;
            let room = PAGE_SIZE - addr % PAGE_SIZE;
            let n = fill(&mut input, &mut page[..room])?;
            if n == 0 {
                break;
            }
            if addr + n > Address::SPACE {
                return Err(Error::AddressOutOfRange {
                    addr: addr as u32,
                    len: n,
                });
            }

            log::debug!("Programming {} bytes at 0x{:06X}", n, addr);
            spi25::page_program(&mut self.bus, addr as u32, &page[..n], wait)?;
            written += n;
            progress.write_progress(written);
        }

        log::info!("Programmed {} bytes at 0x{:06X}", written, base);
        Ok(written)
    }

    /// Erase `[base, base + size)` using 64 KiB and 4 KiB erases
    pub fn erase(&mut self, base: u32, size: usize) -> Result<()> {
        self.erase_with_progress(base, size, &mut NoProgress)
    }

    /// Erase a range, reporting progress
    ///
    /// Steps are not realigned: a step whose address is not on its block
    /// boundary still erases the whole block containing it.
    pub fn erase_with_progress(
        &mut self,
        base: u32,
        size: usize,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        let plan = ErasePlan::new(base, size)?;
        let timing = self.timing();
        progress.erasing(plan.len(), plan.erase_len());

        let mut erased = 0;
        for (i, step) in plan.enumerate() {
            if !step.is_aligned() {
                log::warn!(
                    "Erase at {} is not {} KiB aligned; the whole block is erased",
                    step.address,
                    step.granularity.size() >> 10
                );
            }
            let wait = match step.granularity {
                EraseGranularity::Subsector4K => Self::wait(ERASE_4K_POLL, timing.erase_4k),
                EraseGranularity::Sector64K => Self::wait(ERASE_64K_POLL, timing.erase_64k),
            };
            log::debug!(
                "Erasing {} KiB at {}",
                step.granularity.size() >> 10,
                step.address
            );
            spi25::erase_block(&mut self.bus, &step.command(), wait)?;
            erased += step.granularity.size();
            progress.erase_progress(i + 1, erased);
        }
        Ok(())
    }

    /// Erase the whole chip
    pub fn erase_chip(&mut self) -> Result<()> {
        let wait = Self::wait(ERASE_CHIP_POLL, self.timing().erase_chip);
        log::info!("Erasing chip (may take up to {:?})", self.timing().erase_chip);
        spi25::chip_erase(&mut self.bus, wait)
    }

    /// Wait for any running cycle to end, polling at `interval`
    pub fn wait_ready(&mut self, interval: Duration, timeout: Duration) -> Result<()> {
        wait_ready(&mut self.bus, Wait::new(interval, timeout))
    }
}

/// Read from `input` until `buf` is full or the stream ends
fn fill<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
