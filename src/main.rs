//! iceflash - SPI flash programmer for iCE40 FPGA boards
//!
//! Reads, writes and erases the configuration flash on iCEstick style boards
//! through an FTDI MPSSE bridge, or against an in-memory emulated chip.
//!
//! # Architecture
//!
//! The command sequencing lives in `iceflash-core`; programmer crates provide
//! a [`Board`](iceflash_core::programmer::Board), which is a SPI transport
//! that can also hold the FPGA in reset. Every command runs inside a session
//! that wakes the flash first and powers it down afterwards.

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use commands::write::EraseMode;
use iceflash_core::programmer::PlatformInit;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let platform = PlatformInit::new();

    match cli.command {
        Commands::Id { programmer } => {
            programmers::with_programmer(&programmer, &platform, |board| {
                commands::with_session(board, false, |_, chip| commands::id::run_id(chip))
            })
        }
        Commands::Read {
            programmer,
            length,
            offset,
            output,
        } => programmers::with_programmer(&programmer, &platform, |board| {
            commands::with_session(board, false, |flash, _| {
                commands::read::run_read(flash, offset, length, output.as_deref())
            })
        }),
        Commands::Write {
            programmer,
            input,
            bulk_erase,
            no_erase,
            verify,
        } => {
            let erase = EraseMode::from_flags(bulk_erase, no_erase);
            programmers::with_programmer(&programmer, &platform, |board| {
                commands::with_session(board, true, |flash, chip| {
                    commands::write::run_write(flash, chip, &input, erase, verify)
                })?;
                commands::write::report_config_done(board)
            })
        }
        Commands::Erase {
            programmer,
            start,
            length,
        } => {
            let range = start.zip(length);
            programmers::with_programmer(&programmer, &platform, |board| {
                commands::with_session(board, true, |flash, chip| {
                    commands::erase::run_erase(flash, chip, range)
                })
            })
        }
        Commands::Status { programmer } => {
            programmers::with_programmer(&programmer, &platform, |board| {
                commands::with_session(board, false, |flash, _| {
                    commands::status::run_status(flash)
                })
            })
        }
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::ListChips => {
            commands::list_chips();
            Ok(())
        }
    }
}
