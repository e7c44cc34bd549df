//! High-level flash operations
//!
//! [`FlashController`] owns a transport for the session and sequences the
//! protocol commands for identify, read, program and erase.

mod controller;
mod erase;
mod progress;

pub use controller::{
    FlashController, ERASE_4K_POLL, ERASE_64K_POLL, ERASE_CHIP_POLL, PROGRAM_POLL,
};
pub use erase::{EraseGranularity, ErasePlan, EraseStep, SECTOR_SIZE, SUBSECTOR_SIZE};
pub use progress::{NoProgress, Progress};
