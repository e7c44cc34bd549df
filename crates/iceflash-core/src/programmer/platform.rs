//! One-time bus platform initialization

use std::marker::PhantomData;

use once_cell::sync::OnceCell;

use crate::error::{Error, Result};

/// Initialize-once handle for the bus platform
///
/// Owned by whoever opens the first transport and passed to every later
/// one. The initializer runs at most once; later calls see its cached
/// outcome, including a cached failure.
#[derive(Debug, Default)]
pub struct PlatformInit {
    outcome: OnceCell<std::result::Result<(), String>>,
}

/// Proof that the bus platform has been initialized
#[derive(Debug, Clone, Copy)]
pub struct Platform<'a> {
    _init: PhantomData<&'a PlatformInit>,
}

impl PlatformInit {
    /// Create an uninitialized handle
    pub const fn new() -> Self {
        PlatformInit {
            outcome: OnceCell::new(),
        }
    }

    /// Run `f` unless it already ran, and return the platform token
    pub fn init<F>(&self, f: F) -> Result<Platform<'_>>
    where
        F: FnOnce() -> Result<()>,
    {
        let outcome = self.outcome.get_or_init(|| {
            log::debug!("Initializing bus platform");
            f().map_err(|e| e.to_string())
        });
        match outcome {
            Ok(()) => Ok(Platform { _init: PhantomData }),
            Err(msg) => Err(Error::Platform(msg.clone())),
        }
    }

    /// Whether the initializer has run
    pub fn is_initialized(&self) -> bool {
        self.outcome.get().is_some()
    }
}
