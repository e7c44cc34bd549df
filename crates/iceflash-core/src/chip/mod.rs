//! Flash identity and chip resolution
//!
//! The set of supported chips is closed: an identity either matches one of
//! the [`KnownChip`] variants or resolves to [`Chip::Unknown`], which falls
//! back to the conservative [`TimingProfile`].

mod timing;

use std::fmt;

pub use timing::TimingProfile;

/// 3-byte JEDEC identity: manufacturer, memory type, capacity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlashIdentity(pub [u8; 3]);

impl FlashIdentity {
    /// JEDEC manufacturer code
    pub const fn manufacturer(&self) -> u8 {
        self.0[0]
    }

    /// Memory type byte
    pub const fn memory_type(&self) -> u8 {
        self.0[1]
    }

    /// Capacity byte
    pub const fn capacity(&self) -> u8 {
        self.0[2]
    }
}

impl fmt::Display for FlashIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// Flash chips with known timing characteristics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KnownChip {
    /// Micron N25Q032 (iCEstick)
    MicronN25Q32,
    /// Winbond W25Q128 (iCEBreaker)
    WinbondW25Q128,
}

impl KnownChip {
    /// Every known chip
    pub const ALL: [KnownChip; 2] = [KnownChip::MicronN25Q32, KnownChip::WinbondW25Q128];

    /// Look up a chip by its JEDEC identity
    pub const fn from_identity(id: FlashIdentity) -> Option<Self> {
        match id.0 {
            [0x20, 0xBA, 0x16] => Some(KnownChip::MicronN25Q32),
            [0xEF, 0x70, 0x18] => Some(KnownChip::WinbondW25Q128),
            _ => None,
        }
    }

    /// JEDEC identity reported by the chip
    pub const fn identity(self) -> FlashIdentity {
        match self {
            KnownChip::MicronN25Q32 => FlashIdentity([0x20, 0xBA, 0x16]),
            KnownChip::WinbondW25Q128 => FlashIdentity([0xEF, 0x70, 0x18]),
        }
    }

    /// Human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            KnownChip::MicronN25Q32 => "Micron N25Q 32Mb",
            KnownChip::WinbondW25Q128 => "Winbond W25Q 128Mb",
        }
    }

    /// Capacity in bytes
    pub const fn size(self) -> usize {
        match self {
            KnownChip::MicronN25Q32 => 4 << 20,
            KnownChip::WinbondW25Q128 => 16 << 20,
        }
    }

    /// Datasheet worst-case timings
    pub const fn timing(self) -> TimingProfile {
        match self {
            // N25Q032 Table 38: AC Characteristics; tRES1/tDP not specified
            KnownChip::MicronN25Q32 => TimingProfile {
                power_up: TimingProfile::ZERO,
                power_down: TimingProfile::ZERO,
                page_program: TimingProfile::ms(5),
                erase_4k: TimingProfile::ms(800),
                erase_64k: TimingProfile::ms(3_000),
                erase_chip: TimingProfile::ms(60_000),
            },
            // W25Q128 9.6 AC Electrical Characteristics
            KnownChip::WinbondW25Q128 => TimingProfile {
                power_up: TimingProfile::us(3),
                power_down: TimingProfile::us(3),
                page_program: TimingProfile::ms(3),
                erase_4k: TimingProfile::ms(400),
                erase_64k: TimingProfile::ms(2_000),
                erase_chip: TimingProfile::ms(200_000),
            },
        }
    }
}

/// A chip resolved from its identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Chip {
    /// Identity matched a known chip
    Known(KnownChip),
    /// Identity not in the known table
    Unknown(FlashIdentity),
}

impl Chip {
    /// Resolve an identity; never fails
    pub const fn resolve(id: FlashIdentity) -> Self {
        match KnownChip::from_identity(id) {
            Some(chip) => Chip::Known(chip),
            None => Chip::Unknown(id),
        }
    }

    /// JEDEC identity
    pub const fn identity(&self) -> FlashIdentity {
        match self {
            Chip::Known(chip) => chip.identity(),
            Chip::Unknown(id) => *id,
        }
    }

    /// Chip name, empty for unknown identities
    pub const fn name(&self) -> &'static str {
        match self {
            Chip::Known(chip) => chip.name(),
            Chip::Unknown(_) => "",
        }
    }

    /// Capacity in bytes, if known
    pub const fn size(&self) -> Option<usize> {
        match self {
            Chip::Known(chip) => Some(chip.size()),
            Chip::Unknown(_) => None,
        }
    }

    /// Timing profile for this chip
    ///
    /// Unknown chips get the element-wise maximum over all known chips.
    pub fn timing(&self) -> TimingProfile {
        match self {
            Chip::Known(chip) => chip.timing(),
            Chip::Unknown(_) => TimingProfile::conservative(),
        }
    }

    /// Whether the identity matched a known chip
    pub const fn is_known(&self) -> bool {
        matches!(self, Chip::Known(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known() {
        let chip = Chip::resolve(FlashIdentity([0x20, 0xBA, 0x16]));
        assert_eq!(chip, Chip::Known(KnownChip::MicronN25Q32));
        assert_eq!(chip.name(), "Micron N25Q 32Mb");
        assert_eq!(chip.size(), Some(4 * 1024 * 1024));

        let chip = Chip::resolve(FlashIdentity([0xEF, 0x70, 0x18]));
        assert_eq!(chip.name(), "Winbond W25Q 128Mb");
        assert_eq!(chip.timing(), KnownChip::WinbondW25Q128.timing());
    }

    #[test]
    fn test_resolve_unknown() {
        let id = FlashIdentity([0xC2, 0x20, 0x17]);
        let chip = Chip::resolve(id);
        assert_eq!(chip, Chip::Unknown(id));
        assert_eq!(chip.name(), "");
        assert_eq!(chip.identity(), id);
        assert!(!chip.is_known());
        assert_eq!(chip.timing(), TimingProfile::conservative());
    }

    #[test]
    fn test_identity_roundtrip() {
        for chip in KnownChip::ALL {
            assert_eq!(KnownChip::from_identity(chip.identity()), Some(chip));
        }
    }

    #[test]
    fn test_identity_display() {
        let id = FlashIdentity([0x20, 0xBA, 0x16]);
        assert_eq!(id.to_string(), "20BA16");
        assert_eq!(id.manufacturer(), 0x20);
        assert_eq!(id.memory_type(), 0xBA);
        assert_eq!(id.capacity(), 0x16);
    }
}
