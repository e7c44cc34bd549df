//! Read command implementation

use super::{BoardFlash, CmdResult, IndicatifProgress};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Read `length` bytes at `offset` into `output`, or hex dump them to stdout
pub fn run_read(
    flash: &mut BoardFlash<'_>,
    offset: u32,
    length: usize,
    output: Option<&Path>,
) -> CmdResult {
    match output {
        Some(path) => {
            let mut progress = IndicatifProgress::new();
            let data = flash.read_with_progress(offset, length, &mut progress)?;
            progress.finish("Read complete");

            fs::write(path, &data)?;
            println!(
                "Read {} bytes at 0x{:06X} to {}",
                data.len(),
                offset,
                path.display()
            );
        }
        None => {
            let data = flash.read(offset, length)?;
            print!("{}", hexdump(offset, &data));
        }
    }
    Ok(())
}

/// Render `data` as a canonical hex dump, labelling lines from `base`
///
/// Each line holds 16 bytes in two groups of eight followed by their
/// printable ASCII form.
pub fn hexdump(base: u32, data: &[u8]) -> String {
    let mut out = String::new();
    for (i, line) in data.chunks(16).enumerate() {
        let _ = write!(out, "{:08x} ", base as usize + i * 16);
        for j in 0..16 {
            if j == 8 {
                out.push(' ');
            }
            match line.get(j) {
                Some(b) => {
                    let _ = write!(out, " {:02x}", b);
                }
                None => out.push_str("   "),
            }
        }
        out.push_str("  |");
        out.extend(line.iter().map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}
