//! Progress reporting for long line-by-line reads.
//!
//! Readers in [`crate::lines`] and [`crate::tsv`] accept any [`Progress`]
//! implementation and call [`Progress::tick`] with the running line count
//! after each line. Three implementations ship with the crate:
//!
//! - [`NoProgress`]: does nothing
//! - [`LogEvery`]: logs the count every N lines through the `log` facade
//! - any `FnMut(usize)` closure, e.g. one returned by [`counter_callback`]
//!   that drives an `indicatif` counter
//!
//! # Examples
//!
//! ```rust
//! use std::io::Cursor;
//! use tabfile::lines::read_lines_with_progress;
//! use tabfile::progress::LogEvery;
//!
//! let lines = read_lines_with_progress(Cursor::new("a\nb\n"), LogEvery::new(1)).unwrap();
//! assert_eq!(lines.len(), 2);
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const TEMPLATE_LINE_COUNTER: &str = "{spinner} {msg} {pos} lines - {per_sec}";

/// Receives the number of lines processed so far.
pub trait Progress {
    fn tick(&mut self, lines: usize);
}

/// Progress sink that ignores every tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn tick(&mut self, _lines: usize) {}
}

impl<F: FnMut(usize)> Progress for F {
    fn tick(&mut self, lines: usize) {
        self(lines)
    }
}

/// Logs the line count at `info` level every `frequency` lines.
///
/// A frequency of zero never logs.
#[derive(Debug, Clone)]
pub struct LogEvery {
    frequency: usize,
    label: Option<String>,
}

impl LogEvery {
    pub fn new(frequency: usize) -> Self {
        Self {
            frequency,
            label: None,
        }
    }

    /// Prefix each log line with `label`, e.g. the file being read.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn frequency(&self) -> usize {
        self.frequency
    }

    /// True when `current` falls on the logging cadence.
    pub fn should_log(&self, current: usize) -> bool {
        self.frequency != 0 && current % self.frequency == 0
    }
}

impl Progress for LogEvery {
    fn tick(&mut self, lines: usize) {
        if !self.should_log(lines) {
            return;
        }
        match &self.label {
            Some(label) => log::info!("{}: {}", label, lines),
            None => log::info!("{}", lines),
        }
    }
}

/// Configuration for progress display behavior
#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    /// Whether to suppress all progress output
    pub quiet_mode: bool,
}

impl ProgressConfig {
    /// Create progress configuration from environment and CLI arguments
    pub fn from_env(quiet: bool) -> Self {
        let env_quiet = std::env::var("TABFILE_QUIET").is_ok();
        Self {
            quiet_mode: quiet || env_quiet,
        }
    }

    /// Determine if progress bars should be displayed
    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }

        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }

    /// Create a line counter without a known total.
    ///
    /// Returns a hidden bar if progress should not be shown.
    pub fn create_counter(&self, msg: &str) -> ProgressBar {
        if !self.should_show_progress() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template(TEMPLATE_LINE_COUNTER)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Progress callback that moves `bar` to the current line count.
pub fn counter_callback(bar: &ProgressBar) -> impl FnMut(usize) + '_ {
    move |lines| bar.set_position(lines as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_every_cadence() {
        let every = LogEvery::new(3);
        assert!(!every.should_log(1));
        assert!(!every.should_log(2));
        assert!(every.should_log(3));
        assert!(every.should_log(6));
    }

    #[test]
    fn test_log_every_zero_never_logs() {
        let every = LogEvery::new(0);
        assert!(!every.should_log(0));
        assert!(!every.should_log(100));
    }

    #[test]
    fn test_closure_is_progress() {
        let mut seen = Vec::new();
        {
            let mut callback = |n: usize| seen.push(n);
            callback.tick(1);
            callback.tick(2);
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_explicit_quiet_flag() {
        let config = ProgressConfig::from_env(true);
        assert!(!config.should_show_progress());
    }

    #[test]
    fn test_counter_callback_sets_position() {
        let bar = ProgressBar::hidden();
        {
            let mut callback = counter_callback(&bar);
            callback.tick(42);
        }
        assert_eq!(bar.position(), 42);
    }
}
