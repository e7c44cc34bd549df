//! iceflash-dummy - In-memory flash emulator
//!
//! This crate provides a transport that emulates a 25-series SPI flash chip
//! at the raw frame level. It is useful for testing and development without
//! a board attached.
//!
//! The emulation follows the device behavior the controller depends on:
//! program and erase are ignored unless the write-enable latch is set, the
//! latch clears after each cycle, programming can only clear bits, page
//! programs wrap within their page, erases act on the aligned block, and
//! a configurable number of status polls report busy after each cycle.
//!
//! # Programmer Options
//!
//! - `id=<6 hex digits>` - JEDEC identity (default: 20BA16, N25Q032)
//! - `size=<bytes>` - Array size, accepts `k`/`m` suffixes (default: 4m)
//! - `max-tx=<bytes>` - Largest transaction (default: 65536)
//! - `busy-polls=<n>` - Status polls reporting busy after program/erase
//! - `image=<path>` - Initial contents

mod error;
mod flash;
#[cfg(test)]
mod scenarios;

pub use error::{DummyError, Result};
pub use flash::{DummyConfig, DummyFlash};

/// Parse programmer options into a configuration
///
/// Format: "id=<hex>,size=<n>,max-tx=<n>,busy-polls=<n>,image=<path>"
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "id" => {
                config.id = parse_id(value)?;
            }
            "size" => {
                config.size = parse_size(value)?;
                if config.size == 0 || config.size > 1 << 24 {
                    return Err(DummyError::InvalidParameter(format!(
                        "Invalid size '{}': must be 1 byte to 16 MiB",
                        value
                    )));
                }
            }
            "max-tx" | "max_tx" => {
                config.max_transaction_len = parse_size(value)?;
                if config.max_transaction_len < 5 {
                    return Err(DummyError::InvalidParameter(format!(
                        "Invalid max-tx '{}': must be at least 5",
                        value
                    )));
                }
            }
            "busy-polls" | "busy_polls" => {
                config.busy_polls = value.parse().map_err(|_| {
                    DummyError::InvalidParameter(format!("Invalid busy-polls '{}'", value))
                })?;
            }
            "image" => {
                config.image = Some(value.into());
            }
            _ => {
                log::warn!("Unknown dummy option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

fn parse_id(value: &str) -> Result<[u8; 3]> {
    let invalid = || {
        DummyError::InvalidParameter(format!("Invalid id '{}': expected 6 hex digits", value))
    };
    let digits = value.trim_start_matches("0x");
    if digits.len() != 6 {
        return Err(invalid());
    }
    let raw = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
    Ok([(raw >> 16) as u8, (raw >> 8) as u8, raw as u8])
}

fn parse_size(value: &str) -> Result<usize> {
    let lower = value.to_ascii_lowercase();
    let (digits, mult) = if let Some(n) = lower.strip_suffix('k') {
        (n, 1024)
    } else if let Some(n) = lower.strip_suffix('m') {
        (n, 1024 * 1024)
    } else {
        (lower.as_str(), 1)
    };
    digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(mult))
        .ok_or_else(|| DummyError::InvalidParameter(format!("Invalid size '{}'", value)))
}
