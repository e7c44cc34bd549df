//! FT2232H MPSSE protocol constants and command builders

// ============================================================================
// USB identifiers
// ============================================================================

/// FTDI vendor ID
pub const FTDI_VID: u16 = 0x0403;

/// FT2232H product ID
pub const FTDI_FT2232H_PID: u16 = 0x6010;

// ============================================================================
// MPSSE Commands
// ============================================================================

/// Write bytes on negative clock edge (SPI mode 0/2)
pub const MPSSE_DO_WRITE: u8 = 0x10;

/// Read bytes on positive clock edge (SPI mode 0/2)
pub const MPSSE_DO_READ: u8 = 0x20;

/// Write on negative clock edge
pub const MPSSE_WRITE_NEG: u8 = 0x01;

/// Set data bits low byte
pub const SET_BITS_LOW: u8 = 0x80;

/// Get data bits low byte
pub const GET_BITS_LOW: u8 = 0x81;

/// Disable loopback mode
pub const LOOPBACK_END: u8 = 0x85;

/// Set clock divisor
pub const TCK_DIVISOR: u8 = 0x86;

/// Send immediate (flush buffers)
pub const SEND_IMMEDIATE: u8 = 0x87;

/// Disable divide-by-5 prescaler (60 MHz clock)
pub const DIS_DIV_5: u8 = 0x8A;

// ============================================================================
// Clocking
// ============================================================================

/// Base clock with the divide-by-5 prescaler disabled
pub const BASE_CLOCK_HZ: u32 = 60_000_000;

/// Default clock divisor (30 MHz SPI clock, AN_135 3.2.1)
pub const DEFAULT_DIVISOR: u16 = 2;

/// Largest single MPSSE data transfer (AN_108)
pub const MAX_TRANSFER: usize = 65536;

// ============================================================================
// Pin assignments (ADBUS, low byte)
//
// Matches the iCEstick/iCEBreaker USB-to-SPI wiring: the FPGA configuration
// flash shares SCK/MOSI/MISO with the FPGA, CS goes to iCE_SS_B and the
// FPGA's CRESET_B/CDONE are on the upper bits.
// ============================================================================

/// ADBUS0: SCK
pub const PIN_SCK: u8 = 1 << 0;
/// ADBUS1: MOSI
pub const PIN_MOSI: u8 = 1 << 1;
/// ADBUS2: MISO
pub const PIN_MISO: u8 = 1 << 2;
/// ADBUS4: flash chip select (iCE_SS_B)
pub const PIN_CS: u8 = 1 << 4;
/// ADBUS6: FPGA configuration done (iCE_CDONE)
pub const PIN_CDONE: u8 = 1 << 6;
/// ADBUS7: FPGA reset (iCE_CRESET)
pub const PIN_CRESET: u8 = 1 << 7;

/// Output pins; MISO and CDONE are inputs
pub const PIN_DIRECTION: u8 = PIN_SCK | PIN_MOSI | PIN_CS | PIN_CRESET;

// MISO and CDONE must never be driven
const _: () = assert!(PIN_DIRECTION & (PIN_MISO | PIN_CDONE) == 0);

/// Idle levels: chip select high, FPGA out of reset
pub const IDLE_LEVELS: u8 = PIN_CS | PIN_CRESET;

/// FTDI interface/channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FtdiInterface {
    /// Channel A (default, wired to the flash)
    #[default]
    A,
    /// Channel B
    B,
}

impl FtdiInterface {
    /// Parse interface from character
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(FtdiInterface::A),
            'B' => Some(FtdiInterface::B),
            _ => None,
        }
    }

    /// Get the channel letter
    pub fn letter(&self) -> char {
        match self {
            FtdiInterface::A => 'A',
            FtdiInterface::B => 'B',
        }
    }
}

/// MPSSE setup sequence: 60 MHz base clock, divisor, no loopback, pin state
pub fn init_commands(divisor: u16, levels: u8, direction: u8) -> Vec<u8> {
    // MPSSE divisor value is (divisor / 2 - 1)
    let value = divisor / 2 - 1;
    let mut buf = vec![DIS_DIV_5, TCK_DIVISOR, value as u8, (value >> 8) as u8, LOOPBACK_END];
    buf.extend_from_slice(&set_pins(levels, direction));
    buf
}

/// Drive the low byte pins
pub fn set_pins(levels: u8, direction: u8) -> [u8; 3] {
    [SET_BITS_LOW, levels, direction]
}

/// Full-duplex byte transfer of `data`, flushed immediately
///
/// The device answers with exactly `data.len()` bytes.
pub fn transfer_command(data: &[u8]) -> Vec<u8> {
    debug_assert!(!data.is_empty() && data.len() <= MAX_TRANSFER);
    let len = data.len() - 1;
    let mut buf = Vec::with_capacity(data.len() + 4);
    buf.push(MPSSE_DO_WRITE | MPSSE_DO_READ | MPSSE_WRITE_NEG);
    buf.push(len as u8);
    buf.push((len >> 8) as u8);
    buf.extend_from_slice(data);
    buf.push(SEND_IMMEDIATE);
    buf
}

/// Read the low byte pin levels
pub fn read_pins_command() -> [u8; 2] {
    [GET_BITS_LOW, SEND_IMMEDIATE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_commands() {
        assert_eq!(
            init_commands(2, IDLE_LEVELS, PIN_DIRECTION),
            [0x8A, 0x86, 0x00, 0x00, 0x85, 0x80, 0x90, 0x93]
        );
        // 1 MHz
        assert_eq!(init_commands(60, 0, 0)[2..4], [29, 0]);
    }

    #[test]
    fn test_transfer_command() {
        assert_eq!(
            transfer_command(&[0x9F, 0, 0, 0]),
            [0x31, 0x03, 0x00, 0x9F, 0, 0, 0, 0x87]
        );
        let big = vec![0u8; MAX_TRANSFER];
        let cmd = transfer_command(&big);
        assert_eq!(cmd[1..3], [0xFF, 0xFF]);
        assert_eq!(cmd.len(), MAX_TRANSFER + 4);
    }

    #[test]
    fn test_pin_masks() {
        assert_eq!(set_pins(IDLE_LEVELS & !PIN_CS, PIN_DIRECTION), [0x80, 0x80, 0x93]);
    }

    #[test]
    fn test_interface_parse() {
        assert_eq!(FtdiInterface::from_char('b'), Some(FtdiInterface::B));
        assert_eq!(FtdiInterface::from_char('C'), None);
        assert_eq!(FtdiInterface::A.letter(), 'A');
    }
}
