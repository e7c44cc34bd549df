//! iceflash-ftdi - FT2232H MPSSE transport
//!
//! This crate drives the FTDI FT2232H found on iCE40 development boards
//! (Lattice iCEstick, 1BitSquared iCEBreaker) as an SPI master for the
//! FPGA's configuration flash, and controls the FPGA's reset line so the
//! FPGA releases the shared SPI bus while the flash is programmed.
//!
//! Requires the system libftdi1 library.
//!
//! # Example
//!
//! ```no_run
//! use iceflash_core::flash::FlashController;
//! use iceflash_core::programmer::PlatformInit;
//! use iceflash_ftdi::{platform_init, Ftdi, FtdiConfig};
//!
//! let init = PlatformInit::new();
//! let platform = init.init(platform_init)?;
//! let ftdi = Ftdi::open(&platform, &FtdiConfig::default())?;
//! let mut flash = FlashController::new(ftdi);
//! flash.power_up()?;
//! let (id, name) = flash.identify()?;
//! println!("{} {}", id, name);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Programmer Options
//!
//! - `port=<A|B>` - Channel to use (default: A)
//! - `divisor=<N>` - Clock divisor (2-65534, even; default: 2)
//!
//! # SPI Clock Speed
//!
//! The SPI clock is derived from a 60 MHz base clock:
//!
//! ```text
//! SPI_clock = 60 MHz / divisor
//! ```
//!
//! | Divisor | SPI Clock |
//! |---------|-----------|
//! | 2       | 30 MHz    |
//! | 4       | 15 MHz    |
//! | 6       | 10 MHz    |
//! | 60      | 1 MHz     |

mod device;
mod error;
mod protocol;

pub use device::{parse_options, platform_init, Ftdi, FtdiConfig};
pub use error::{FtdiError, Result};
pub use protocol::FtdiInterface;
