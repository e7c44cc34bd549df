//! List commands implementation

use super::format_size;
use crate::programmers;
use iceflash_core::chip::KnownChip;

/// List all compiled-in programmers
pub fn list_programmers() {
    print!("{}", programmers::programmer_help());
    println!();
    println!("Options are given as name:key=value,... (e.g. ftdi:port=A,divisor=4)");
}

/// List all known flash chips
pub fn list_chips() {
    println!("Known flash chips:");
    println!();
    println!("{:<22} {:>10} {:>10}", "Name", "Size", "JEDEC ID");
    println!("{}", "-".repeat(44));

    for chip in KnownChip::ALL {
        println!(
            "{:<22} {:>10} {:>10}",
            chip.name(),
            format_size(chip.size()),
            chip.identity().to_string()
        );
    }

    println!();
    println!("Other chips are driven with the slowest timing of the chips above.");
}
