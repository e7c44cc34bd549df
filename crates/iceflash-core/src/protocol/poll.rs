//! Busy polling

use std::time::Duration;

use crate::error::{Error, Result};
use crate::programmer::SpiTransport;

use super::spi25::read_status;

/// How to wait for a program or erase cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wait {
    /// Delay between status polls
    pub interval: Duration,
    /// Give up after this long; zero waits forever
    pub timeout: Duration,
}

impl Wait {
    /// Create a wait policy
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Wait { interval, timeout }
    }
}

/// Block until the busy bit clears
///
/// The status register is read once up front and the call returns
/// immediately if the device is idle. Otherwise it sleeps `interval`,
/// polls, and only then checks the deadline, so a device that finishes
/// right at the deadline is still reported ready. A zero timeout polls
/// until the device is idle. Any status read failure is returned.
pub fn wait_ready<T: SpiTransport + ?Sized>(bus: &mut T, wait: Wait) -> Result<()> {
    if !read_status(bus)?.is_busy() {
        return Ok(());
    }

    let start = bus.now();
    let mut polls = 0u64;
    loop {
        bus.delay(wait.interval);
        polls += 1;
        let status = read_status(bus)?;
        if !status.is_busy() {
            log::trace!("Ready after {} polls", polls);
            return Ok(());
        }

        let waited = bus.now().saturating_duration_since(start);
        if !wait.timeout.is_zero() && waited >= wait.timeout {
            log::debug!("Still busy after {:?} ({})", waited, status);
            return Err(Error::Timeout { waited });
        }
    }
}
