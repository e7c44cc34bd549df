//! Progress reporting with indicatif

use iceflash_core::flash::Progress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter using indicatif progress bars
///
/// Each phase replaces the previous one; starting a new phase finishes
/// the bar of the phase before it.
pub struct IndicatifProgress {
    multi: MultiProgress,
    current_bar: Option<ProgressBar>,
    phase: &'static str,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current_bar: None,
            phase: "",
        }
    }

    fn create_bar(&mut self, total: u64, phase: &'static str) {
        self.finish_phase();
        self.phase = phase;
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                    phase
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.current_bar = Some(pb);
    }

    /// Show a spinner for a phase without a byte count
    pub fn spinner(&mut self, phase: &'static str, message: String) {
        self.finish_phase();
        self.phase = phase;
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        self.current_bar = Some(pb);
    }

    /// Start the programming bar for `total_bytes`
    pub fn writing(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, "Write");
    }

    /// Finish the current phase with `message`
    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    fn finish_phase(&mut self) {
        if !self.phase.is_empty() {
            let message = format!("{} complete", self.phase);
            self.finish(&message);
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for IndicatifProgress {
    fn reading(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, "Read");
    }

    fn read_progress(&mut self, bytes_read: usize) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(bytes_read as u64);
        }
    }

    fn erasing(&mut self, steps: usize, bytes: usize) {
        self.spinner(
            "Erase",
            format!("Erasing {} blocks ({} bytes)...", steps, bytes),
        );
    }

    fn erase_progress(&mut self, steps_done: usize, bytes_done: usize) {
        if let Some(pb) = &self.current_bar {
            pb.set_message(format!(
                "Erased {} blocks ({} bytes)...",
                steps_done, bytes_done
            ));
        }
    }

    fn write_progress(&mut self, bytes_written: usize) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(bytes_written as u64);
        }
    }
}
