//! Flash command set and frame encoding

use super::address::Address;
use super::opcodes;
use crate::error::{Error, Result};

/// Largest payload a single page program accepts
pub const PAGE_SIZE: usize = 256;

/// Opcode plus 24-bit address
pub const ADDRESSED_HEADER_LEN: usize = 4;

/// Length of the JEDEC identity returned by RDID
const ID_LEN: usize = 3;

/// A single flash command with its parameters
///
/// Each command maps to one opcode and one frame shape: bare opcode,
/// opcode followed by a 24-bit address, or address plus payload. Bytes
/// that only clock a response in are sent as zeros.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Release from deep power-down
    PowerUp,
    /// Enter deep power-down
    PowerDown,
    /// Read the 3-byte JEDEC identity
    ReadId,
    /// Read `len` bytes starting at `address`
    Read {
        /// Start address
        address: Address,
        /// Number of data bytes to clock in
        len: usize,
    },
    /// Set the write-enable latch
    WriteEnable,
    /// Program up to one page starting at `address`
    PageProgram {
        /// Start address
        address: Address,
        /// Payload, 1..=256 bytes
        data: &'a [u8],
    },
    /// Erase the 4 KiB subsector containing the address
    Erase4K(Address),
    /// Erase the 64 KiB sector containing the address
    Erase64K(Address),
    /// Erase the whole array
    EraseChip,
    /// Read the status register
    ReadStatus,
}

impl Command<'_> {
    /// Opcode byte sent first in the frame
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::PowerUp => opcodes::RES,
            Command::PowerDown => opcodes::DP,
            Command::ReadId => opcodes::RDID,
            Command::Read { .. } => opcodes::READ,
            Command::WriteEnable => opcodes::WREN,
            Command::PageProgram { .. } => opcodes::PP,
            Command::Erase4K(_) => opcodes::SE_20,
            Command::Erase64K(_) => opcodes::BE_D8,
            Command::EraseChip => opcodes::CE_C7,
            Command::ReadStatus => opcodes::RDSR,
        }
    }

    /// Address carried by the frame, if any
    pub const fn address(&self) -> Option<Address> {
        match *self {
            Command::Read { address, .. }
            | Command::PageProgram { address, .. }
            | Command::Erase4K(address)
            | Command::Erase64K(address) => Some(address),
            _ => None,
        }
    }

    /// Bytes before any payload or response: the opcode and address
    ///
    /// Response bytes start at this offset in the exchanged buffer.
    pub const fn header_len(&self) -> usize {
        if self.address().is_some() {
            ADDRESSED_HEADER_LEN
        } else {
            1
        }
    }

    /// Number of bytes clocked in after the header
    pub const fn response_len(&self) -> usize {
        match self {
            Command::ReadId => ID_LEN,
            Command::ReadStatus => 1,
            Command::Read { len, .. } => *len,
            _ => 0,
        }
    }

    /// Total frame length
    pub const fn frame_len(&self) -> usize {
        let payload = match self {
            Command::PageProgram { data, .. } => data.len(),
            _ => 0,
        };
        self.header_len() + payload + self.response_len()
    }

    /// Short name used in log output
    pub const fn name(&self) -> &'static str {
        match self {
            Command::PowerUp => "power up",
            Command::PowerDown => "power down",
            Command::ReadId => "read id",
            Command::Read { .. } => "read",
            Command::WriteEnable => "write enable",
            Command::PageProgram { .. } => "page program",
            Command::Erase4K(_) => "erase 4KB",
            Command::Erase64K(_) => "erase 64KB",
            Command::EraseChip => "erase chip",
            Command::ReadStatus => "read status",
        }
    }

    /// Build the exact frame to transmit
    ///
    /// Fails only for a page program whose payload is empty or longer
    /// than [`PAGE_SIZE`].
    pub fn encode(&self) -> Result<Vec<u8>> {
        if let Command::PageProgram { data, .. } = self {
            if data.is_empty() || data.len() > PAGE_SIZE {
                return Err(Error::PageOverflow(data.len()));
            }
        }

        let mut frame = Vec::with_capacity(self.frame_len());
        frame.push(self.opcode());
        if let Some(address) = self.address() {
            frame.extend_from_slice(&address.to_be_bytes());
        }
        if let Command::PageProgram { data, .. } = self {
            frame.extend_from_slice(data);
        }
        frame.resize(self.frame_len(), 0);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(a: u32) -> Address {
        Address::new(a).unwrap()
    }

    #[test]
    fn test_bare_opcodes() {
        assert_eq!(Command::PowerUp.encode().unwrap(), [0xAB]);
        assert_eq!(Command::PowerDown.encode().unwrap(), [0xB9]);
        assert_eq!(Command::WriteEnable.encode().unwrap(), [0x06]);
        assert_eq!(Command::EraseChip.encode().unwrap(), [0xC7]);
    }

    #[test]
    fn test_response_frames() {
        assert_eq!(Command::ReadId.encode().unwrap(), [0x9F, 0, 0, 0]);
        assert_eq!(Command::ReadStatus.encode().unwrap(), [0x05, 0]);
        assert_eq!(Command::ReadId.header_len(), 1);
        assert_eq!(Command::ReadStatus.response_len(), 1);
    }

    #[test]
    fn test_read_frame() {
        let cmd = Command::Read {
            address: addr(0x012345),
            len: 5,
        };
        assert_eq!(
            cmd.encode().unwrap(),
            [0x03, 0x01, 0x23, 0x45, 0, 0, 0, 0, 0]
        );
        assert_eq!(cmd.header_len(), ADDRESSED_HEADER_LEN);
    }

    #[test]
    fn test_erase_frames() {
        assert_eq!(
            Command::Erase4K(addr(0x001000)).encode().unwrap(),
            [0x20, 0x00, 0x10, 0x00]
        );
        assert_eq!(
            Command::Erase64K(addr(0xFF0000)).encode().unwrap(),
            [0xD8, 0xFF, 0x00, 0x00]
        );
    }

    #[test]
    fn test_page_program_frame() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        let cmd = Command::PageProgram {
            address: addr(0x000100),
            data: &data,
        };
        assert_eq!(
            cmd.encode().unwrap(),
            [0x02, 0x00, 0x01, 0x00, 0xDE, 0xAD, 0xBE, 0xEF]
        );
    }

    #[test]
    fn test_page_program_limits() {
        let full = [0x55u8; PAGE_SIZE];
        let frame = Command::PageProgram {
            address: addr(0),
            data: &full,
        }
        .encode()
        .unwrap();
        assert_eq!(frame.len(), ADDRESSED_HEADER_LEN + PAGE_SIZE);

        let over = [0u8; PAGE_SIZE + 1];
        assert!(matches!(
            Command::PageProgram {
                address: addr(0),
                data: &over,
            }
            .encode(),
            Err(Error::PageOverflow(257))
        ));
        assert!(matches!(
            Command::PageProgram {
                address: addr(0),
                data: &[],
            }
            .encode(),
            Err(Error::PageOverflow(0))
        ));
    }
}
