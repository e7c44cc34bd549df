//! 25-series SPI flash opcodes
//!
//! Only the single-I/O, 3-byte address subset implemented by both the
//! Micron N25Q and Winbond W25Q parts is listed here.

// ============================================================================
// Power state
// ============================================================================

/// Release from Deep Power-Down
pub const RES: u8 = 0xAB;
/// Deep Power-Down
pub const DP: u8 = 0xB9;

// ============================================================================
// Identification and status
// ============================================================================

/// Read JEDEC ID (manufacturer, memory type, capacity)
pub const RDID: u8 = 0x9F;
/// Read Status Register
pub const RDSR: u8 = 0x05;

// ============================================================================
// Read / program
// ============================================================================

/// Read Data
pub const READ: u8 = 0x03;
/// Write Enable - required before any program/erase operation
pub const WREN: u8 = 0x06;
/// Page Program (up to 256 bytes)
pub const PP: u8 = 0x02;

// ============================================================================
// Erase
// ============================================================================

/// Subsector/Sector Erase (4 KiB)
pub const SE_20: u8 = 0x20;
/// Sector/Block Erase (64 KiB)
pub const BE_D8: u8 = 0xD8;
/// Bulk/Chip Erase
pub const CE_C7: u8 = 0xC7;

// ============================================================================
// Status register bits
// ============================================================================

/// Write In Progress (busy)
pub const SR_WIP: u8 = 0x01;
/// Write Enable Latch
pub const SR_WEL: u8 = 0x02;
/// Block Protect bit 0
pub const SR_BP0: u8 = 0x04;
/// Block Protect bit 1
pub const SR_BP1: u8 = 0x08;
/// Block Protect bit 2
pub const SR_BP2: u8 = 0x10;
/// Top/Bottom protect
pub const SR_TB: u8 = 0x20;
/// Sector/Block protect
pub const SR_SEC: u8 = 0x40;
/// Status Register Protect
pub const SR_SRP: u8 = 0x80;
