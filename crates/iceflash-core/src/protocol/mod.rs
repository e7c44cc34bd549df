//! 25-series SPI flash protocol
//!
//! Free functions that issue individual commands over a transport. They do
//! no identity-dependent decisions; timing is passed in by the caller.

mod poll;
pub mod spi25;

pub use poll::{wait_ready, Wait};
