//! iceflash-core - Command sequencing for serial NOR flash on FPGA boards
//!
//! This crate turns high-level flash operations (identify, read, program,
//! erase, power state) into framed SPI transactions for the 25-series
//! command set used by the configuration flash on iCE40 boards such as the
//! iCEstick and iCEBreaker.
//!
//! The bus itself is abstracted behind [`programmer::SpiTransport`]; the
//! [`flash::FlashController`] owns one transport for the whole session.
//!
//! # Example
//!
//! ```ignore
//! use iceflash_core::flash::FlashController;
//!
//! fn dump<T: iceflash_core::programmer::SpiTransport>(bus: T) -> iceflash_core::Result<Vec<u8>> {
//!     let mut flash = FlashController::new(bus);
//!     flash.power_up()?;
//!     let (id, name) = flash.identify()?;
//!     println!("{} {}", id, name);
//!     let data = flash.read(0, 256)?;
//!     flash.power_down()?;
//!     Ok(data)
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod chip;
pub mod error;
pub mod flash;
pub mod programmer;
pub mod protocol;
pub mod spi;

pub use error::{Error, Result};
