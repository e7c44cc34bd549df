//! ID command implementation

use super::{format_size, CmdResult};
use iceflash_core::chip::Chip;

/// Print the JEDEC identity and chip name, tab separated
///
/// The name is empty for chips outside the known table.
pub fn run_id(chip: Chip) -> CmdResult {
    println!("{}\t{}", chip.identity(), chip.name());
    if let Some(size) = chip.size() {
        log::info!("Capacity: {}", format_size(size));
    }
    Ok(())
}
