//! Transport abstraction
//!
//! The flash core talks to the hardware only through [`SpiTransport`]:
//! full-duplex transfers, a chip-select line and a clock. Boards that can
//! also hold the FPGA in reset implement [`FpgaControl`].

mod chip_select;
mod platform;
mod traits;

pub use chip_select::{transact, ChipSelectGuard};
pub use platform::{Platform, PlatformInit};
pub use traits::{Board, ChipSelect, FpgaControl, SpiTransport, MAX_TRANSACTION_LEN};
