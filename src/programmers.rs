//! Programmer registration and dispatch
//!
//! This module provides a centralized registry for all programmers, with support
//! for feature-gated inclusion and dynamic help text generation.

use iceflash_core::programmer::{Board, PlatformInit};

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &["emulator"],
        description:
            "In-memory flash emulator (id=<hex>,size=<bytes>,max-tx=<n>,busy-polls=<n>,image=<path>)",
    });

    #[cfg(feature = "ftdi")]
    programmers.push(ProgrammerInfo {
        name: "ftdi",
        aliases: &["ft2232h", "icestick"],
        description: "FT2232H MPSSE on iCE40 boards (VID:0403 PID:6010) (port=<A|B>,divisor=<n>)",
    });

    programmers
}

/// Generate help text listing all available programmers
pub fn programmer_help() -> String {
    let programmers = available_programmers();

    if programmers.is_empty() {
        return "No programmers available (recompile with programmer features enabled)".to_string();
    }

    let mut help = String::from("Available programmers:\n");

    for p in &programmers {
        help.push_str(&format!("  {:12} - {}\n", p.name, p.description));
        if !p.aliases.is_empty() {
            help.push_str(&format!("  {:12}   aliases: {}\n", "", p.aliases.join(", ")));
        }
    }

    help
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Resolve a programmer name or alias to its primary name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.contains(&name))
        .map(|p| p.name)
}

/// Execute a function with the specified programmer
///
/// The programmer string can be just the name (e.g., "ftdi") or include
/// parameters (e.g., "ftdi:port=B,divisor=4"). Programmers that need the
/// one-time platform setup run it through `platform`.
#[allow(unused_variables)]
pub fn with_programmer<F>(
    programmer: &str,
    platform: &PlatformInit,
    f: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut dyn Board) -> Result<(), Box<dyn std::error::Error>>,
{
    // Parse programmer name and options
    let (name, options) = parse_programmer_string(programmer);

    // First check if the programmer is available at all
    let canonical_name = match find_programmer(name) {
        Some(n) => n,
        None => {
            return Err(unknown_programmer_error(name));
        }
    };

    // Dispatch to the appropriate programmer
    match canonical_name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            use iceflash_dummy::{parse_options, DummyFlash};

            let config =
                parse_options(&options).map_err(|e| format!("Invalid dummy parameters: {}", e))?;
            let mut board = DummyFlash::open(config)
                .map_err(|e| format!("Failed to open dummy flash: {}", e))?;
            f(&mut board)
        }

        #[cfg(feature = "ftdi")]
        "ftdi" => {
            use iceflash_ftdi::{parse_options, platform_init, Ftdi};

            // Parse configuration from options
            let config =
                parse_options(&options).map_err(|e| format!("Invalid FTDI parameters: {}", e))?;

            let token = platform.init(platform_init)?;

            log::info!(
                "Opening FTDI programmer ({:.1} MHz)...",
                config.spi_clock_mhz()
            );

            let mut board = Ftdi::open(&token, &config).map_err(|e| {
                format!(
                    "Failed to open FTDI device: {}\n\
                     Make sure the device is connected and you have permissions.\n\
                     You may need to unbind the kernel ftdi_sio driver:\n\
                     echo -n '<bus>-<port>' | sudo tee /sys/bus/usb/drivers/ftdi_sio/unbind",
                    e
                )
            })?;

            f(&mut board)
        }

        _ => Err(unknown_programmer_error(name)),
    }
}

/// Parse a programmer string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_programmer_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

fn unknown_programmer_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown programmer: {}\n\n", name);
    msg.push_str(&programmer_help());
    msg.push_str("\nUse 'iceflash list-programmers' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_programmer_string() {
        assert_eq!(parse_programmer_string("ftdi"), ("ftdi", vec![]));
        assert_eq!(
            parse_programmer_string("ftdi:port=B,divisor=4"),
            ("ftdi", vec![("port", "B"), ("divisor", "4")])
        );
        // Options without a value are dropped
        assert_eq!(
            parse_programmer_string("dummy:size=4m,bogus"),
            ("dummy", vec![("size", "4m")])
        );
    }

    #[test]
    fn test_unknown_programmer() {
        assert_eq!(find_programmer("ch341a"), None);
        let platform = PlatformInit::new();
        let err = with_programmer("ch341a", &platform, |_| Ok(())).unwrap_err();
        assert!(err.to_string().contains("Unknown programmer: ch341a"));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_dispatch() {
        assert_eq!(find_programmer("emulator"), Some("dummy"));

        let platform = PlatformInit::new();
        let mut id = None;
        with_programmer("dummy:id=EF7018", &platform, |board| {
            let mut flash = iceflash_core::flash::FlashController::new(board);
            id = Some(flash.identify()?.0);
            Ok(())
        })
        .unwrap();
        assert_eq!(id.unwrap().to_string(), "EF7018");
        // The dummy board needs no platform setup
        assert!(!platform.is_initialized());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_bad_option() {
        let platform = PlatformInit::new();
        let err = with_programmer("dummy:size=0", &platform, |_| Ok(())).unwrap_err();
        assert!(err.to_string().starts_with("Invalid dummy parameters"));
    }
}
