//! Erase command implementation

use super::{format_size, BoardFlash, CmdResult, IndicatifProgress};
use iceflash_core::chip::Chip;

/// Run the erase command
///
/// With a range, the range is covered with 64 KiB and 4 KiB erases;
/// otherwise the whole chip is erased.
pub fn run_erase(flash: &mut BoardFlash<'_>, chip: Chip, range: Option<(u32, usize)>) -> CmdResult {
    let mut progress = IndicatifProgress::new();

    match range {
        Some((start, length)) => {
            if let Some(size) = chip.size() {
                if start as usize + length > size {
                    return Err(format!(
                        "Erase range 0x{:06X}..0x{:06X} is outside chip bounds (0x{:06X})",
                        start,
                        start as usize + length,
                        size
                    )
                    .into());
                }
            }
            flash.erase_with_progress(start, length, &mut progress)?;
            progress.finish("Erase complete");
            println!("Erased {} bytes starting at 0x{:06X}", length, start);
        }
        None => {
            let what = chip
                .size()
                .map(format_size)
                .unwrap_or_else(|| "chip of unknown size".to_string());
            progress.spinner(
                "Erase",
                format!("Erasing {} (this may take a while)...", what),
            );
            flash.erase_chip()?;
            progress.finish("Erase complete");
            println!("Chip erase complete");
        }
    }

    Ok(())
}
