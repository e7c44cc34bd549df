//! Operation timing profiles

use std::time::Duration;

use super::KnownChip;

/// Worst-case durations for each timed flash operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimingProfile {
    /// Settle time after release from power-down (tRES1)
    pub power_up: Duration,
    /// Settle time after entering power-down (tDP)
    pub power_down: Duration,
    /// Page program cycle (tPP)
    pub page_program: Duration,
    /// 4 KiB subsector erase cycle
    pub erase_4k: Duration,
    /// 64 KiB sector erase cycle
    pub erase_64k: Duration,
    /// Chip erase cycle
    pub erase_chip: Duration,
}

impl TimingProfile {
    pub(crate) const ZERO: Duration = Duration::ZERO;

    pub(crate) const fn us(us: u64) -> Duration {
        Duration::from_micros(us)
    }

    pub(crate) const fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    /// Element-wise maximum over every known chip
    ///
    /// Used for unidentified chips so that no wait is ever shorter than
    /// any supported part requires.
    pub fn conservative() -> Self {
        KnownChip::ALL
            .iter()
            .map(|chip| chip.timing())
            .fold(TimingProfile::default(), |acc, t| acc.max(&t))
    }

    /// Field-by-field maximum of two profiles
    pub fn max(&self, other: &TimingProfile) -> TimingProfile {
        TimingProfile {
            power_up: self.power_up.max(other.power_up),
            power_down: self.power_down.max(other.power_down),
            page_program: self.page_program.max(other.page_program),
            erase_4k: self.erase_4k.max(other.erase_4k),
            erase_64k: self.erase_64k.max(other.erase_64k),
            erase_chip: self.erase_chip.max(other.erase_chip),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservative_is_fieldwise_max() {
        let t = TimingProfile::conservative();
        let all: Vec<TimingProfile> = KnownChip::ALL.iter().map(|c| c.timing()).collect();
        let max = |f: fn(&TimingProfile) -> Duration| all.iter().map(f).max().unwrap();

        assert_eq!(t.power_up, max(|p| p.power_up));
        assert_eq!(t.power_down, max(|p| p.power_down));
        assert_eq!(t.page_program, max(|p| p.page_program));
        assert_eq!(t.erase_4k, max(|p| p.erase_4k));
        assert_eq!(t.erase_64k, max(|p| p.erase_64k));
        assert_eq!(t.erase_chip, max(|p| p.erase_chip));
    }

    #[test]
    fn test_conservative_values() {
        let t = TimingProfile::conservative();
        assert_eq!(t.power_up, Duration::from_micros(3));
        assert_eq!(t.page_program, Duration::from_millis(5));
        assert_eq!(t.erase_4k, Duration::from_millis(800));
        assert_eq!(t.erase_64k, Duration::from_secs(3));
        assert_eq!(t.erase_chip, Duration::from_secs(200));
    }
}
