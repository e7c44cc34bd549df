//! Progress reporting hooks

/// Callback for progress reporting during long operations
///
/// All methods default to doing nothing.
pub trait Progress {
    /// Called before a read of `total_bytes`
    fn reading(&mut self, _total_bytes: usize) {}

    /// Called after each read block
    fn read_progress(&mut self, _bytes_read: usize) {}

    /// Called before the first erase step
    fn erasing(&mut self, _steps: usize, _bytes: usize) {}

    /// Called after each erase step
    fn erase_progress(&mut self, _steps_done: usize, _bytes_done: usize) {}

    /// Called after each programmed piece
    fn write_progress(&mut self, _bytes_written: usize) {}
}

/// A no-op progress reporter
pub struct NoProgress;

impl Progress for NoProgress {}
