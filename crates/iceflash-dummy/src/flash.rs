//! Emulated flash chip

use std::path::PathBuf;
use std::time::{Duration, Instant};

use iceflash_core::error::{Error, Result as CoreResult};
use iceflash_core::programmer::{ChipSelect, FpgaControl, SpiTransport, MAX_TRANSACTION_LEN};
use iceflash_core::spi::{opcodes, StatusRegister, ADDRESSED_HEADER_LEN, PAGE_SIZE};

use crate::error::Result;

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC identity returned by RDID
    pub id: [u8; 3],
    /// Array size in bytes; addresses wrap at this size
    pub size: usize,
    /// Largest transaction the emulated transport accepts
    pub max_transaction_len: usize,
    /// Number of status reads reporting busy after each program/erase
    pub busy_polls: u32,
    /// File loaded into the array on open
    pub image: Option<PathBuf>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            id: [0x20, 0xBA, 0x16], // Micron N25Q032
            size: 4 * 1024 * 1024,
            max_transaction_len: MAX_TRANSACTION_LEN,
            busy_polls: 0,
            image: None,
        }
    }
}

/// Dummy flash transport
///
/// Emulates a flash chip in memory. Every frame exchanged is kept in a
/// transaction log, and time only advances through [`SpiTransport::delay`].
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    write_enabled: bool,
    busy_remaining: u32,
    powered_down: bool,
    selected: bool,
    fpga_held: bool,
    log: Vec<Vec<u8>>,
    fail_opcode: Option<u8>,
    fail_deassert: bool,
    epoch: Instant,
    elapsed: Duration,
}

impl DummyFlash {
    /// Create a new dummy flash with the given configuration, erased to 0xFF
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            write_enabled: false,
            busy_remaining: 0,
            powered_down: false,
            selected: false,
            fpga_held: false,
            log: Vec::new(),
            fail_opcode: None,
            fail_deassert: false,
            epoch: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new dummy flash with default configuration (N25Q032)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = initial_data.len().min(flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Create a dummy flash, loading `config.image` if set
    pub fn open(config: DummyConfig) -> Result<Self> {
        match config.image.clone() {
            Some(path) => {
                let image = std::fs::read(&path)?;
                log::info!("Loaded {} bytes from {}", image.len(), path.display());
                Ok(Self::with_data(config, &image))
            }
            None => Ok(Self::new(config)),
        }
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Every frame sent so far, as sent
    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.log
    }

    /// Opcode of every frame sent so far
    pub fn opcodes(&self) -> Vec<u8> {
        self.log.iter().filter_map(|f| f.first().copied()).collect()
    }

    /// Forget the transaction log
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Whether chip select is currently asserted
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the FPGA is held in reset
    pub fn fpga_held(&self) -> bool {
        self.fpga_held
    }

    /// Whether the chip is in deep power-down
    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    /// Virtual time spent in delays
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Fail the next transfer whose opcode is `opcode`
    pub fn fail_on(&mut self, opcode: u8) {
        self.fail_opcode = Some(opcode);
    }

    /// Fail the next chip-select deassert
    pub fn fail_next_deassert(&mut self) {
        self.fail_deassert = true;
    }

    fn status(&self) -> StatusRegister {
        let mut sr = StatusRegister::empty();
        sr.set(StatusRegister::BUSY, self.busy_remaining > 0);
        sr.set(StatusRegister::WEL, self.write_enabled);
        sr
    }

    fn address(&self, frame: &[u8]) -> usize {
        let addr = ((frame[1] as usize) << 16) | ((frame[2] as usize) << 8) | frame[3] as usize;
        addr % self.data.len()
    }

    /// Consume the write-enable latch for a program/erase cycle
    fn start_cycle(&mut self, what: &str) -> bool {
        if !self.write_enabled {
            log::warn!("Dummy: {} ignored, write enable latch not set", what);
            return false;
        }
        self.write_enabled = false;
        self.busy_remaining = self.config.busy_polls;
        true
    }

    fn handle_read(&mut self, frame: &mut [u8]) {
        let addr = self.address(frame);
        let size = self.data.len();
        for (i, byte) in frame[ADDRESSED_HEADER_LEN..].iter_mut().enumerate() {
            *byte = self.data[(addr + i) % size];
        }
    }

    fn handle_page_program(&mut self, frame: &[u8]) {
        if !self.start_cycle("page program") {
            return;
        }
        let addr = self.address(frame);
        let page = addr - addr % PAGE_SIZE;
        // Programming can only clear bits and wraps within the page
        for (i, &byte) in frame[ADDRESSED_HEADER_LEN..].iter().enumerate() {
            let target = page + (addr % PAGE_SIZE + i) % PAGE_SIZE;
            if let Some(cell) = self.data.get_mut(target) {
                *cell &= byte;
            }
        }
    }

    fn handle_block_erase(&mut self, frame: &[u8], erase_size: usize) {
        if !self.start_cycle("block erase") {
            return;
        }
        let addr = self.address(frame);
        let aligned = addr & !(erase_size - 1);
        let end = (aligned + erase_size).min(self.data.len());
        self.data[aligned..end].fill(0xFF);
    }

    fn handle_chip_erase(&mut self) {
        if self.start_cycle("chip erase") {
            self.data.fill(0xFF);
        }
    }

    fn execute(&mut self, frame: &mut [u8]) {
        let opcode = frame[0];

        if self.powered_down {
            if opcode == opcodes::RES {
                self.powered_down = false;
            } else {
                log::debug!("Dummy: opcode 0x{:02X} ignored in power-down", opcode);
            }
            return;
        }

        if self.busy_remaining > 0 && opcode != opcodes::RDSR {
            log::warn!("Dummy: opcode 0x{:02X} ignored while busy", opcode);
            return;
        }

        match opcode {
            opcodes::RES => {}
            opcodes::DP => self.powered_down = true,
            opcodes::RDID => {
                for (byte, id) in frame[1..].iter_mut().zip(self.config.id) {
                    *byte = id;
                }
            }
            opcodes::RDSR => {
                let status = self.status().bits();
                frame[1..].fill(status);
                self.busy_remaining = self.busy_remaining.saturating_sub(1);
            }
            opcodes::WREN => self.write_enabled = true,
            opcodes::READ if frame.len() >= ADDRESSED_HEADER_LEN => self.handle_read(frame),
            opcodes::PP if frame.len() > ADDRESSED_HEADER_LEN => self.handle_page_program(frame),
            opcodes::SE_20 if frame.len() >= ADDRESSED_HEADER_LEN => {
                self.handle_block_erase(frame, 4 * 1024)
            }
            opcodes::BE_D8 if frame.len() >= ADDRESSED_HEADER_LEN => {
                self.handle_block_erase(frame, 64 * 1024)
            }
            opcodes::CE_C7 => self.handle_chip_erase(),
            _ => log::warn!("Dummy: unsupported opcode 0x{:02X}", opcode),
        }
    }
}

impl SpiTransport for DummyFlash {
    fn max_transaction_len(&self) -> usize {
        self.config.max_transaction_len
    }

    fn transfer(&mut self, buf: &mut [u8]) -> CoreResult<()> {
        if !self.selected {
            return Err(Error::ChipSelect("transfer without chip select".into()));
        }
        if buf.len() > self.config.max_transaction_len {
            return Err(Error::Transfer(format!(
                "{} byte transfer exceeds {} byte limit",
                buf.len(),
                self.config.max_transaction_len
            )));
        }
        self.log.push(buf.to_vec());
        if buf.is_empty() {
            return Ok(());
        }
        if self.fail_opcode == Some(buf[0]) {
            self.fail_opcode = None;
            return Err(Error::Transfer(format!("injected failure on 0x{:02X}", buf[0])));
        }
        self.execute(buf);
        Ok(())
    }

    fn set_chip_select(&mut self, level: ChipSelect) -> CoreResult<()> {
        match level {
            ChipSelect::Asserted => self.selected = true,
            ChipSelect::Deasserted => {
                self.selected = false;
                if self.fail_deassert {
                    self.fail_deassert = false;
                    return Err(Error::ChipSelect("injected deassert failure".into()));
                }
            }
        }
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        self.elapsed += duration;
    }

    fn now(&self) -> Instant {
        self.epoch + self.elapsed
    }
}

impl FpgaControl for DummyFlash {
    fn hold_reset(&mut self, hold: bool) -> CoreResult<()> {
        log::debug!("Dummy: FPGA reset {}", if hold { "held" } else { "released" });
        self.fpga_held = hold;
        Ok(())
    }

    fn config_done(&mut self) -> CoreResult<Option<bool>> {
        Ok(Some(!self.fpga_held))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iceflash_core::programmer::transact;

    fn flash() -> DummyFlash {
        DummyFlash::new(DummyConfig {
            size: 128 * 1024,
            ..Default::default()
        })
    }

    fn tx(flash: &mut DummyFlash, frame: &[u8]) -> Vec<u8> {
        let mut buf = frame.to_vec();
        transact(flash, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_read_jedec_id() {
        let mut flash = flash();
        assert_eq!(tx(&mut flash, &[0x9F, 0, 0, 0]), [0x9F, 0x20, 0xBA, 0x16]);
    }

    #[test]
    fn test_program_requires_write_enable() {
        let mut flash = flash();
        tx(&mut flash, &[0x02, 0, 0, 0, 0x12, 0x34]);
        assert_eq!(flash.data()[..2], [0xFF, 0xFF]);

        tx(&mut flash, &[0x06]);
        assert_eq!(tx(&mut flash, &[0x05, 0])[1], 0x02);
        tx(&mut flash, &[0x02, 0, 0, 0, 0x12, 0x34]);
        assert_eq!(flash.data()[..2], [0x12, 0x34]);
        // latch cleared by the cycle
        assert_eq!(tx(&mut flash, &[0x05, 0])[1], 0x00);
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut flash = flash();
        flash.data_mut()[0] = 0xF0;
        tx(&mut flash, &[0x06]);
        tx(&mut flash, &[0x02, 0, 0, 0, 0x3C]);
        assert_eq!(flash.data()[0], 0x30);
    }

    #[test]
    fn test_program_wraps_within_page() {
        let mut flash = flash();
        flash.data_mut()[..512].fill(0xFF);
        tx(&mut flash, &[0x06]);
        tx(&mut flash, &[0x02, 0, 0, 0xFE, 1, 2, 3]);
        assert_eq!(flash.data()[0xFE..0x100], [1, 2]);
        assert_eq!(flash.data()[0x00], 3);
        assert_eq!(flash.data()[0x100], 0xFF);
    }

    #[test]
    fn test_erase_aligns_down() {
        let mut flash = flash();
        flash.data_mut().fill(0x00);
        tx(&mut flash, &[0x06]);
        tx(&mut flash, &[0x20, 0x00, 0x17, 0xFF]);
        assert!(flash.data()[0x1000..0x2000].iter().all(|&b| b == 0xFF));
        assert_eq!(flash.data()[0x0FFF], 0x00);
        assert_eq!(flash.data()[0x2000], 0x00);

        tx(&mut flash, &[0x06]);
        tx(&mut flash, &[0xD8, 0x01, 0x80, 0x00]);
        assert!(flash.data()[0x10000..0x20000].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_busy_after_cycle() {
        let mut flash = DummyFlash::new(DummyConfig {
            size: 4096,
            busy_polls: 2,
            ..Default::default()
        });
        tx(&mut flash, &[0x06]);
        tx(&mut flash, &[0xC7]);
        assert_eq!(tx(&mut flash, &[0x05, 0])[1], 0x01);
        // ignored while busy
        tx(&mut flash, &[0x06]);
        assert_eq!(tx(&mut flash, &[0x05, 0])[1], 0x01);
        assert_eq!(tx(&mut flash, &[0x05, 0])[1], 0x00);
    }

    #[test]
    fn test_power_down_ignores_commands() {
        let mut flash = flash();
        tx(&mut flash, &[0xB9]);
        assert!(flash.is_powered_down());
        assert_eq!(tx(&mut flash, &[0x9F, 0, 0, 0]), [0x9F, 0, 0, 0]);
        tx(&mut flash, &[0xAB]);
        assert_eq!(tx(&mut flash, &[0x9F, 0, 0, 0])[1..], [0x20, 0xBA, 0x16]);
    }

    #[test]
    fn test_transfer_requires_chip_select() {
        let mut flash = flash();
        let err = flash.transfer(&mut [0x9F, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::ChipSelect(_)));
    }

    #[test]
    fn test_read_wraps_at_array_end() {
        let mut flash = DummyFlash::with_data(
            DummyConfig {
                size: 4,
                ..Default::default()
            },
            &[1, 2, 3, 4],
        );
        assert_eq!(tx(&mut flash, &[0x03, 0, 0, 2, 0, 0, 0])[4..], [3, 4, 1]);
    }
}
