//! SPI command framing
//!
//! This module provides the 24-bit address type, the 25-series opcodes the
//! boards' configuration flash understands, the closed [`Command`] set with
//! its frame encoding, and the decoded status register.

mod address;
mod command;
pub mod opcodes;
mod status;

pub use address::Address;
pub use command::{Command, ADDRESSED_HEADER_LEN, PAGE_SIZE};
pub use status::StatusRegister;
