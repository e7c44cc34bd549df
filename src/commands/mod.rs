//! CLI command implementations
//!
//! Every flash command runs inside a session: the flash is released from
//! deep power-down and identified first, and put back into power-down
//! afterwards. Commands that rewrite the flash also hold the FPGA in reset
//! so that it lets go of the SPI bus.

pub mod erase;
pub mod id;
mod list;
mod progress;
pub mod read;
pub mod status;
pub mod write;

pub use list::{list_chips, list_programmers};
pub use progress::IndicatifProgress;

use iceflash_core::chip::Chip;
use iceflash_core::flash::FlashController;
use iceflash_core::programmer::{Board, FpgaControl};

/// Result type shared by the command implementations
pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Flash controller over a borrowed programmer board
pub type BoardFlash<'a> = FlashController<&'a mut dyn Board>;

/// Run `f` inside a powered-up session on `board`
///
/// Power-down and the FPGA reset release run even when `f` fails. The
/// first error encountered is the one returned.
pub fn with_session<R, F>(board: &mut dyn Board, hold_fpga: bool, f: F) -> CmdResult<R>
where
    F: FnOnce(&mut BoardFlash<'_>, Chip) -> CmdResult<R>,
{
    if hold_fpga {
        log::debug!("Holding FPGA in reset");
        board.hold_reset(true)?;
    }

    let mut flash: BoardFlash<'_> = FlashController::new(&mut *board);
    let result = start(&mut flash).and_then(|chip| f(&mut flash, chip));
    let powered_down = flash.power_down();

    let released = if hold_fpga {
        log::debug!("Releasing FPGA reset");
        board.hold_reset(false)
    } else {
        Ok(())
    };

    let value = result?;
    powered_down?;
    released?;
    Ok(value)
}

fn start(flash: &mut BoardFlash<'_>) -> CmdResult<Chip> {
    flash.power_up()?;
    let (id, _) = flash.identify()?;
    Ok(Chip::resolve(id))
}

/// Format a byte count for display
fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
