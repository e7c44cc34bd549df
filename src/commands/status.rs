//! Status command implementation

use super::{BoardFlash, CmdResult};

/// Read and decode the status register
pub fn run_status(flash: &mut BoardFlash<'_>) -> CmdResult {
    let status = flash.read_status_register()?;

    println!("Status register: {}", status);
    println!("  Write in progress:    {}", yes_no(status.is_busy()));
    println!("  Write enable latch:   {}", yes_no(status.write_enabled()));
    println!("  Block protect (BP):   {}", status.block_protect());
    println!(
        "  Protect from:         {}",
        if status.top_bottom() { "bottom" } else { "top" }
    );
    println!("  Sector protect:       {}", yes_no(status.sector_protect()));
    println!(
        "  Status reg. protect:  {}",
        yes_no(status.status_register_protect())
    );

    Ok(())
}

fn yes_no(set: bool) -> &'static str {
    if set {
        "yes"
    } else {
        "no"
    }
}
