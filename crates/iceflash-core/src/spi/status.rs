//! Status register decoding

use std::fmt;

use bitflags::bitflags;

use super::opcodes;

bitflags! {
    /// Snapshot of the flash status register
    ///
    /// The layout is shared by the N25Q and W25Q parts:
    ///
    /// | Bit | Meaning |
    /// |-----|---------|
    /// | 7   | SRP: status register protect |
    /// | 6   | SEC: sector/block protect |
    /// | 5   | TB: top/bottom protect |
    /// | 4-2 | BP2-BP0: block protect |
    /// | 1   | WEL: write enable latch |
    /// | 0   | BUSY: program/erase in progress |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusRegister: u8 {
        /// Program or erase in progress
        const BUSY = opcodes::SR_WIP;
        /// Write enable latch
        const WEL = opcodes::SR_WEL;
        /// Block protect bit 0
        const BP0 = opcodes::SR_BP0;
        /// Block protect bit 1
        const BP1 = opcodes::SR_BP1;
        /// Block protect bit 2
        const BP2 = opcodes::SR_BP2;
        /// Top/bottom protect
        const TB = opcodes::SR_TB;
        /// Sector protect
        const SEC = opcodes::SR_SEC;
        /// Status register protect
        const SRP = opcodes::SR_SRP;
    }
}

impl StatusRegister {
    /// Decode a raw status byte
    pub const fn from_byte(value: u8) -> Self {
        Self::from_bits_retain(value)
    }

    /// Program/erase cycle in progress
    pub const fn is_busy(&self) -> bool {
        self.contains(Self::BUSY)
    }

    /// Write enable latch is set
    pub const fn write_enabled(&self) -> bool {
        self.contains(Self::WEL)
    }

    /// The 3-bit block protect field (BP2..BP0)
    pub const fn block_protect(&self) -> u8 {
        (self.bits() >> 2) & 0x07
    }

    /// Top/bottom protect bit
    pub const fn top_bottom(&self) -> bool {
        self.contains(Self::TB)
    }

    /// Sector protect bit
    pub const fn sector_protect(&self) -> bool {
        self.contains(Self::SEC)
    }

    /// Status register protect bit
    pub const fn status_register_protect(&self) -> bool {
        self.contains(Self::SRP)
    }
}

impl fmt::Display for StatusRegister {
    /// Binary value followed by the set bits, most significant first,
    /// e.g. `00000011 WEL,BUSY`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.bits())?;
        let mut names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        names.reverse();
        if !names.is_empty() {
            write!(f, " {}", names.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_only() {
        let sr = StatusRegister::from_byte(0b0000_0001);
        assert!(sr.is_busy());
        assert!(!sr.write_enabled());
        assert_eq!(sr.block_protect(), 0);
        assert!(!sr.top_bottom());
        assert!(!sr.sector_protect());
        assert!(!sr.status_register_protect());
    }

    #[test]
    fn test_write_enabled_only() {
        let sr = StatusRegister::from_byte(0b0000_0010);
        assert!(sr.write_enabled());
        assert!(!sr.is_busy());
    }

    #[test]
    fn test_protect_fields() {
        let sr = StatusRegister::from_byte(0b1111_0100);
        assert_eq!(sr.block_protect(), 0b101);
        assert!(sr.top_bottom());
        assert!(sr.sector_protect());
        assert!(sr.status_register_protect());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusRegister::from_byte(0).to_string(), "00000000");
        assert_eq!(StatusRegister::from_byte(0x02).to_string(), "00000010 WEL");
        assert_eq!(
            StatusRegister::from_byte(0x83).to_string(),
            "10000011 SRP,WEL,BUSY"
        );
    }
}
