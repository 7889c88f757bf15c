//! Line-oriented file helpers.
//!
//! - [`lines`]: read, write and copy line sequences
//! - [`tsv`]: tab-separated lines into key → value and key → values maps
//! - [`watch`]: one-shot blocking wait for a file's deletion
//! - [`FileUtil`]: path-based versions of all of the above plus small
//!   wrappers (exists, mkdirs, touch, delete, copy, list, numbers)
//!
//! File access goes through the [`io::FileSystem`] trait so callers can swap
//! in [`testkit::MemoryFileSystem`] under test.

// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod file_util;
pub mod io;
pub mod lines;
pub mod progress;
pub mod testkit;
pub mod tsv;
pub mod watch;

// Re-export commonly used types
pub use crate::errors::{FileUtilError, Result};
pub use crate::file_util::{add_directory_separator_if_necessary, FileUtil};
pub use crate::io::{FileSystem, RealFileSystem};
pub use crate::progress::{LogEvery, NoProgress, Progress};
pub use crate::tsv::{split_fields, MapListOptions};
pub use crate::watch::{DeletionSignal, WatchOutcome};
