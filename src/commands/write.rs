//! Write command implementation

use super::{format_size, BoardFlash, CmdResult, IndicatifProgress};
use iceflash_core::chip::Chip;
use iceflash_core::programmer::{Board, FpgaControl, SpiTransport};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Time allowed for the FPGA to load its configuration after reset release
const CONFIG_SETTLE: Duration = Duration::from_millis(100);

/// How the flash is prepared before programming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// Erase just the blocks covering the image
    Extent,
    /// Erase the whole chip
    Chip,
    /// Program over the current contents
    Skip,
}

impl EraseMode {
    pub fn from_flags(bulk_erase: bool, no_erase: bool) -> Self {
        match (bulk_erase, no_erase) {
            (true, _) => EraseMode::Chip,
            (false, true) => EraseMode::Skip,
            (false, false) => EraseMode::Extent,
        }
    }
}

/// Run the write command
///
/// The image is streamed from `input` and programmed from address 0.
pub fn run_write(
    flash: &mut BoardFlash<'_>,
    chip: Chip,
    input: &Path,
    erase: EraseMode,
    do_verify: bool,
) -> CmdResult {
    let file = File::open(input)?;
    let len = file.metadata()?.len() as usize;

    if let Some(size) = chip.size() {
        if len > size {
            return Err(format!(
                "{} is {} bytes but {} holds only {}",
                input.display(),
                len,
                chip.name(),
                format_size(size)
            )
            .into());
        }
    }

    let mut progress = IndicatifProgress::new();

    match erase {
        EraseMode::Chip => {
            progress.spinner("Erase", "Erasing entire chip (this may take a while)...".into());
            flash.erase_chip()?;
        }
        EraseMode::Extent => flash.erase_with_progress(0, len, &mut progress)?,
        EraseMode::Skip => log::info!("Skipping erase"),
    }

    progress.writing(len);
    let written = flash.program_with_progress(0, BufReader::new(file), &mut progress)?;

    if do_verify {
        let expected = fs::read(input)?;
        if let Some(addr) = flash.verify_with_progress(0, &expected, &mut progress)? {
            progress.finish("Verify failed");
            return Err(format!("Verification failed at 0x{:06X}", addr).into());
        }
    }
    progress.finish(if do_verify {
        "Verify complete"
    } else {
        "Write complete"
    });

    println!("Wrote {} bytes from {}", written, input.display());
    if do_verify {
        println!("Verification passed");
    }
    Ok(())
}

/// Report whether the FPGA came up after the reset was released
pub fn report_config_done(board: &mut dyn Board) -> CmdResult {
    board.delay(CONFIG_SETTLE);
    match board.config_done()? {
        Some(true) => println!("FPGA configured (CDONE high)"),
        Some(false) => log::warn!("FPGA did not signal configuration done"),
        None => {}
    }
    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::commands::with_session;
    use iceflash_dummy::DummyFlash;

    fn image_file(tag: &str, data: &[u8]) -> std::path::PathBuf {
        let path =
            std::env::temp_dir().join(format!("iceflash-{}-{}.bin", tag, std::process::id()));
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_erase_mode_flags() {
        assert_eq!(EraseMode::from_flags(false, false), EraseMode::Extent);
        assert_eq!(EraseMode::from_flags(true, false), EraseMode::Chip);
        assert_eq!(EraseMode::from_flags(false, true), EraseMode::Skip);
    }

    #[test]
    fn test_write_and_verify() {
        let image: Vec<u8> = (0..5000u32).map(|i| (i * 7) as u8).collect();
        let path = image_file("write", &image);

        let mut board = DummyFlash::new_default();
        board.data_mut()[..8192].fill(0x00);
        with_session(&mut board, true, |flash, chip| {
            run_write(flash, chip, &path, EraseMode::Extent, true)
        })
        .unwrap();
        report_config_done(&mut board).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(&board.data()[..image.len()], &image[..]);
        // The rest of the erased 4 KiB block is blank
        assert!(board.data()[image.len()..8192].iter().all(|&b| b == 0xFF));
        assert!(!board.fpga_held());
        assert!(board.is_powered_down());
    }

    #[test]
    fn test_write_without_erase_fails_verify() {
        let path = image_file("noerase", &[0xFF, 0x0F]);

        let mut board = DummyFlash::new_default();
        board.data_mut()[0] = 0x00;
        let err = with_session(&mut board, true, |flash, chip| {
            run_write(flash, chip, &path, EraseMode::Skip, true)
        })
        .unwrap_err();
        let _ = fs::remove_file(&path);

        assert_eq!(err.to_string(), "Verification failed at 0x000000");
        assert!(!board.fpga_held());
    }

    #[test]
    fn test_image_larger_than_chip() {
        let path = image_file("large", &vec![0u8; (4 << 20) + 1]);

        let mut board = DummyFlash::new_default();
        let err = with_session(&mut board, true, |flash, chip| {
            run_write(flash, chip, &path, EraseMode::Extent, false)
        })
        .unwrap_err();
        let _ = fs::remove_file(&path);

        assert!(err.to_string().contains("holds only 4 MiB"));
        // Nothing was erased or programmed
        assert!(!board.opcodes().contains(&iceflash_core::spi::opcodes::WREN));
    }
}
