//! FTDI MPSSE device implementation
//!
//! This module provides the `Ftdi` struct that drives the board's
//! FT2232H channel A as an SPI master for the configuration flash and
//! controls the FPGA's reset line.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use ftdi::{find_by_vid_pid, BitMode, Device, Interface};
use iceflash_core::error::{Error as CoreError, Result as CoreResult};
use iceflash_core::programmer::{ChipSelect, FpgaControl, Platform, SpiTransport};

use crate::error::{FtdiError, Result};
use crate::protocol::*;

/// How long to wait for the device to return requested bytes
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for opening the board's FTDI device
#[derive(Debug, Clone)]
pub struct FtdiConfig {
    /// Interface/channel to use
    pub interface: FtdiInterface,
    /// Clock divisor (2-65534, must be even)
    /// SPI clock = 60 MHz / divisor
    pub divisor: u16,
}

impl Default for FtdiConfig {
    fn default() -> Self {
        FtdiConfig {
            interface: FtdiInterface::default(),
            divisor: DEFAULT_DIVISOR,
        }
    }
}

impl FtdiConfig {
    /// Set the interface/channel
    pub fn interface(mut self, interface: FtdiInterface) -> Self {
        self.interface = interface;
        self
    }

    /// Set the clock divisor
    pub fn divisor(mut self, divisor: u16) -> Result<Self> {
        if divisor < 2 || !divisor.is_multiple_of(2) {
            return Err(FtdiError::InvalidParameter(format!(
                "Invalid divisor {}: must be even, between 2 and 65534",
                divisor
            )));
        }
        self.divisor = divisor;
        Ok(self)
    }

    /// Calculate the SPI clock frequency in MHz
    pub fn spi_clock_mhz(&self) -> f64 {
        BASE_CLOCK_HZ as f64 / 1e6 / self.divisor as f64
    }
}

/// Where usbfs exposes USB device nodes on Linux
const USB_DEVICE_ROOT: &str = "/dev/bus/usb";

/// Kernel driver that claims FT2232H interfaces as serial ports
const FTDI_SIO_DRIVER: &str = "/sys/bus/usb/drivers/ftdi_sio";

/// Check the host side before the first device is opened
///
/// libftdi1 itself needs no global setup. On Linux this verifies that the
/// usbfs device nodes libusb opens are present and readable, so a missing
/// mount or permission problem is reported once instead of as a failed
/// open per device. Meant to be run once per process through
/// [`PlatformInit`](iceflash_core::programmer::PlatformInit).
pub fn platform_init() -> CoreResult<()> {
    if cfg!(target_os = "linux") {
        check_usb_root(std::path::Path::new(USB_DEVICE_ROOT))?;
        if std::path::Path::new(FTDI_SIO_DRIVER).exists() {
            log::debug!("ftdi_sio kernel driver loaded; libftdi will detach it from the interface");
        }
    }
    Ok(())
}

fn check_usb_root(root: &std::path::Path) -> CoreResult<()> {
    let buses = std::fs::read_dir(root).map_err(|e| {
        CoreError::Platform(format!(
            "Cannot access USB device nodes at {}: {}",
            root.display(),
            e
        ))
    })?;
    log::debug!("{} USB buses under {}", buses.count(), root.display());
    Ok(())
}

/// FT2232H MPSSE transport
pub struct Ftdi {
    /// libftdi device context
    device: Device,
    /// Current low byte output levels
    levels: u8,
}

impl Ftdi {
    /// Open the FT2232H with the given configuration
    ///
    /// The platform token shows the one-time host setup has run.
    pub fn open(_platform: &Platform<'_>, config: &FtdiConfig) -> Result<Self> {
        log::info!("Opening FT2232H channel {}", config.interface.letter());

        let interface = match config.interface {
            FtdiInterface::A => Interface::A,
            FtdiInterface::B => Interface::B,
        };

        log::debug!(
            "Looking for FTDI device VID={:04X} PID={:04X}",
            FTDI_VID,
            FTDI_FT2232H_PID
        );

        let mut device = find_by_vid_pid(FTDI_VID, FTDI_FT2232H_PID)
            .interface(interface)
            .open()
            .map_err(|e| FtdiError::OpenFailed(format!("{}", e)))?;

        device
            .usb_reset()
            .map_err(|e| FtdiError::ConfigFailed(format!("USB reset failed: {}", e)))?;

        // Set latency timer (2ms for best performance)
        device
            .set_latency_timer(2)
            .map_err(|e| FtdiError::ConfigFailed(format!("Set latency timer failed: {}", e)))?;

        device
            .set_bitmode(0x00, BitMode::Mpsse)
            .map_err(|e| FtdiError::ConfigFailed(format!("Set MPSSE mode failed: {}", e)))?;

        let mut ftdi = Ftdi {
            device,
            levels: IDLE_LEVELS,
        };

        log::debug!(
            "Setting clock divisor to {}, pins 0x{:02X} dir 0x{:02X}",
            config.divisor,
            IDLE_LEVELS,
            PIN_DIRECTION
        );
        ftdi.send(&init_commands(config.divisor, IDLE_LEVELS, PIN_DIRECTION))?;

        log::info!(
            "FTDI configured for SPI mode 0 at {:.2} MHz",
            config.spi_clock_mhz()
        );

        Ok(ftdi)
    }

    /// Send data to the FTDI device
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.device
            .write_all(data)
            .map_err(|e| FtdiError::TransferFailed(format!("Write failed: {}", e)))?;
        log::trace!("Sent {} bytes", data.len());
        Ok(())
    }

    /// Receive exactly `buf.len()` bytes from the FTDI device
    fn recv(&mut self, buf: &mut [u8]) -> Result<()> {
        let deadline = Instant::now() + READ_TIMEOUT;
        let mut total = 0;

        while total < buf.len() {
            match self.device.read(&mut buf[total..]) {
                Ok(0) => {
                    if Instant::now() > deadline {
                        return Err(FtdiError::TransferFailed(format!(
                            "Read timed out after {} of {} bytes",
                            total,
                            buf.len()
                        )));
                    }
                    // No data available, wait a bit
                    std::thread::sleep(Duration::from_micros(100));
                }
                Ok(n) => {
                    total += n;
                }
                Err(e) => {
                    return Err(FtdiError::TransferFailed(format!("Read failed: {}", e)));
                }
            }
        }

        log::trace!("Received {} bytes", total);
        Ok(())
    }

    fn set_levels(&mut self, levels: u8) -> Result<()> {
        self.send(&set_pins(levels, PIN_DIRECTION))?;
        self.levels = levels;
        Ok(())
    }

    /// Release I/O pins (set all as inputs)
    fn release_pins(&mut self) -> Result<()> {
        self.send(&set_pins(0x00, 0x00))
    }
}

impl Drop for Ftdi {
    fn drop(&mut self) {
        // Release I/O pins on close so the FPGA can boot
        if let Err(e) = self.release_pins() {
            log::warn!("Failed to release pins on close: {}", e);
        }
    }
}

impl SpiTransport for Ftdi {
    fn max_transaction_len(&self) -> usize {
        MAX_TRANSFER
    }

    fn transfer(&mut self, buf: &mut [u8]) -> CoreResult<()> {
        if buf.is_empty() {
            return Ok(());
        }
        self.send(&transfer_command(buf))
            .and_then(|()| self.recv(buf))
            .map_err(|e| CoreError::Transfer(e.to_string()))
    }

    fn set_chip_select(&mut self, level: ChipSelect) -> CoreResult<()> {
        let levels = match level {
            ChipSelect::Asserted => self.levels & !PIN_CS,
            ChipSelect::Deasserted => self.levels | PIN_CS,
        };
        self.set_levels(levels)
            .map_err(|e| CoreError::ChipSelect(e.to_string()))
    }
}

impl FpgaControl for Ftdi {
    fn hold_reset(&mut self, hold: bool) -> CoreResult<()> {
        log::debug!("FPGA reset {}", if hold { "asserted" } else { "released" });
        let levels = if hold {
            self.levels & !PIN_CRESET
        } else {
            self.levels | PIN_CRESET
        };
        self.set_levels(levels)
            .map_err(|e| CoreError::Transfer(e.to_string()))
    }

    fn config_done(&mut self) -> CoreResult<Option<bool>> {
        let mut pins = [0u8; 1];
        self.send(&read_pins_command())
            .and_then(|()| self.recv(&mut pins))
            .map_err(|e| CoreError::Transfer(e.to_string()))?;
        Ok(Some(pins[0] & PIN_CDONE != 0))
    }
}

/// Parse programmer options
///
/// Format: "port=<A|B>,divisor=<N>"
pub fn parse_options(options: &[(&str, &str)]) -> Result<FtdiConfig> {
    let mut config = FtdiConfig::default();

    for (key, value) in options {
        match *key {
            "port" | "channel" => {
                let mut chars = value.chars();
                let interface = match (chars.next(), chars.next()) {
                    (Some(c), None) => FtdiInterface::from_char(c),
                    _ => None,
                }
                .ok_or_else(|| {
                    FtdiError::InvalidChannel(format!(
                        "Invalid channel '{}': must be A or B",
                        value
                    ))
                })?;
                config = config.interface(interface);
            }
            "divisor" => {
                let divisor: u16 = value.parse().map_err(|_| {
                    FtdiError::InvalidParameter(format!("Invalid divisor '{}'", value))
                })?;
                config = config.divisor(divisor)?;
            }
            _ => {
                log::warn!("Unknown FTDI option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}
