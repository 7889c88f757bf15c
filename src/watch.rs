//! One-shot blocking wait for a file's deletion.
//!
//! [`block_on_file_deletion`] returns immediately when the file is absent.
//! Otherwise it registers for deletion events on the file's parent
//! directory and parks the calling thread for a single wake-up. That
//! wake-up is either a batch of deletion events or an interrupt raised via
//! [`DeletionSignal::interrupt`]. The wait does not re-arm: a batch that only
//! names other files still ends the call, reported as
//! [`WatchOutcome::OtherEvent`].
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tabfile::io::RealFileSystem;
//! use tabfile::watch::{block_on_file_deletion, DeletionSignal, WatchOutcome};
//!
//! let signal = DeletionSignal::new();
//! let interrupter = signal.clone();
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_secs(30));
//!     interrupter.interrupt();
//! });
//!
//! let fs = RealFileSystem::new();
//! match block_on_file_deletion(&fs, Path::new("/tmp/job.lock"), &signal)? {
//!     WatchOutcome::Deleted => println!("lock released"),
//!     other => println!("stopped waiting: {:?}", other),
//! }
//! # Ok::<(), tabfile::errors::FileUtilError>(())
//! ```

use crate::errors::Result;
use crate::io::traits::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// How a delete-watch ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The file did not exist when the watch was requested.
    NotPresent,
    /// A deletion event for the watched file name was observed.
    Deleted,
    /// A batch of deletion events arrived, none of them for the watched file.
    OtherEvent,
    /// The wait was interrupted through its [`DeletionSignal`].
    Interrupted,
}

/// What woke a waiting thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    /// Paths reported deleted since the waiter was armed.
    Deleted(Vec<PathBuf>),
    Interrupted,
}

#[derive(Debug, Default)]
struct SignalState {
    pending: Option<Wake>,
    /// Bumped by every [`DeletionSignal::arm`]; reports tagged with an older
    /// value come from a finished watch and are dropped.
    generation: u64,
}

/// Rendezvous between a waiting thread, the event source and interrupters.
///
/// Clones share state, so a clone handed to another thread can interrupt the
/// wait. An interrupt raised before the wait starts makes the next wait
/// return at once. Deletions are only delivered to the watch that armed the
/// signal, so one signal can be reused across consecutive waits.
#[derive(Debug, Clone, Default)]
pub struct DeletionSignal {
    inner: Arc<(Mutex<SignalState>, Condvar)>,
}

impl DeletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SignalState> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new watch.
    ///
    /// Discards deletions left over from earlier watches and returns the
    /// generation the event source must pass to [`Self::notify_deleted`]. A
    /// pending interrupt is kept.
    pub fn arm(&self) -> u64 {
        let mut state = self.state();
        if matches!(state.pending, Some(Wake::Deleted(_))) {
            state.pending = None;
        }
        state.generation += 1;
        state.generation
    }

    /// Wake the waiting thread without a deletion.
    pub fn interrupt(&self) {
        let mut state = self.state();
        state.pending = Some(Wake::Interrupted);
        self.inner.1.notify_all();
    }

    /// Report a batch of deleted paths seen by the watch armed as
    /// `generation`.
    ///
    /// Batches that arrive before the waiter consumes the previous one are
    /// merged. A pending interrupt is left as is, and batches from a
    /// superseded generation are ignored.
    pub fn notify_deleted(&self, generation: u64, paths: Vec<PathBuf>) {
        let mut state = self.state();
        if state.generation != generation {
            log::debug!("Dropping {} stale deletion event(s)", paths.len());
            return;
        }
        match state.pending.as_mut() {
            Some(Wake::Deleted(existing)) => existing.extend(paths),
            Some(Wake::Interrupted) => {}
            None => state.pending = Some(Wake::Deleted(paths)),
        }
        self.inner.1.notify_all();
    }

    /// Block until the next wake-up and consume it.
    pub fn wait_once(&self) -> Wake {
        let cvar = &self.inner.1;
        let mut state = self.state();
        loop {
            if let Some(wake) = state.pending.take() {
                return wake;
            }
            state = cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        self.state().pending.is_some()
    }
}

/// Directory whose deletion events cover `path`.
///
/// A bare file name lives in the current directory.
pub fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Map a wake-up onto the outcome for `path`, matching on file name.
pub fn outcome_for(path: &Path, wake: Wake) -> WatchOutcome {
    match wake {
        Wake::Interrupted => WatchOutcome::Interrupted,
        Wake::Deleted(paths) => {
            let target = path.file_name();
            if target.is_some() && paths.iter().any(|p| p.file_name() == target) {
                WatchOutcome::Deleted
            } else {
                WatchOutcome::OtherEvent
            }
        }
    }
}

/// Block until `path` is deleted, another deletion batch arrives, or
/// `signal` is interrupted.
///
/// # Errors
///
/// Returns an I/O error if the deletion watch cannot be registered.
pub fn block_on_file_deletion<F: FileSystem + ?Sized>(
    fs: &F,
    path: &Path,
    signal: &DeletionSignal,
) -> Result<WatchOutcome> {
    if !fs.exists(path) {
        log::debug!("{} does not exist, not waiting", path.display());
        return Ok(WatchOutcome::NotPresent);
    }

    log::info!("Waiting for file {} to be deleted", path.display());
    let outcome = fs.wait_for_deletion(path, signal)?;
    log::debug!("Deletion watch on {} ended: {:?}", path.display(), outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_watch_dir_for_bare_name_is_current_dir() {
        assert_eq!(watch_dir(Path::new("lock")), PathBuf::from("."));
        assert_eq!(watch_dir(Path::new("run/lock")), PathBuf::from("run"));
        assert_eq!(watch_dir(Path::new("/tmp/lock")), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_outcome_matches_file_name() {
        let wake = Wake::Deleted(vec![PathBuf::from("/abs/dir/lock")]);
        assert_eq!(outcome_for(Path::new("dir/lock"), wake), WatchOutcome::Deleted);

        let wake = Wake::Deleted(vec![PathBuf::from("/abs/dir/other")]);
        assert_eq!(
            outcome_for(Path::new("dir/lock"), wake),
            WatchOutcome::OtherEvent
        );

        assert_eq!(
            outcome_for(Path::new("dir/lock"), Wake::Interrupted),
            WatchOutcome::Interrupted
        );
    }

    #[test]
    fn test_interrupt_before_wait_returns_immediately() {
        let signal = DeletionSignal::new();
        signal.interrupt();
        assert!(signal.is_pending());
        assert_eq!(signal.wait_once(), Wake::Interrupted);
        assert!(!signal.is_pending());
    }

    #[test]
    fn test_deleted_batches_merge_until_consumed() {
        let signal = DeletionSignal::new();
        let armed = signal.arm();
        signal.notify_deleted(armed, vec![PathBuf::from("a")]);
        signal.notify_deleted(armed, vec![PathBuf::from("b")]);
        assert_eq!(
            signal.wait_once(),
            Wake::Deleted(vec![PathBuf::from("a"), PathBuf::from("b")])
        );
    }

    #[test]
    fn test_interrupt_wins_over_later_events() {
        let signal = DeletionSignal::new();
        let armed = signal.arm();
        signal.interrupt();
        signal.notify_deleted(armed, vec![PathBuf::from("a")]);
        assert_eq!(signal.wait_once(), Wake::Interrupted);
    }

    #[test]
    fn test_arm_discards_leftover_deletions() {
        let signal = DeletionSignal::new();
        let first = signal.arm();
        signal.notify_deleted(first, vec![PathBuf::from("a")]);
        assert_eq!(signal.wait_once(), Wake::Deleted(vec![PathBuf::from("a")]));

        // Late event from the first watch, queued after its wake-up.
        signal.notify_deleted(first, vec![PathBuf::from("b")]);
        let second = signal.arm();
        assert!(!signal.is_pending());

        // And one that arrives after the second watch is armed.
        signal.notify_deleted(first, vec![PathBuf::from("b")]);
        assert!(!signal.is_pending());

        signal.notify_deleted(second, vec![PathBuf::from("c")]);
        assert_eq!(signal.wait_once(), Wake::Deleted(vec![PathBuf::from("c")]));
    }

    #[test]
    fn test_arm_keeps_pending_interrupt() {
        let signal = DeletionSignal::new();
        signal.interrupt();
        signal.arm();
        assert_eq!(signal.wait_once(), Wake::Interrupted);
    }

    #[test]
    fn test_interrupt_from_other_thread_wakes_waiter() {
        let signal = DeletionSignal::new();
        let interrupter = signal.clone();
        let handle = thread::spawn(move || interrupter.interrupt());
        assert_eq!(signal.wait_once(), Wake::Interrupted);
        handle.join().unwrap();
    }
}
