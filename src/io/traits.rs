//! The file-system seam.
//!
//! Everything in tabfile that touches files goes through [`FileSystem`].
//! Production code uses [`RealFileSystem`](crate::io::RealFileSystem); tests
//! use [`MemoryFileSystem`](crate::testkit::MemoryFileSystem), which keeps
//! files in memory and delivers deletion events itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabfile::io::traits::FileSystem;
//!
//! fn first_line<F: FileSystem>(fs: &F, path: &Path) -> Result<Option<String>> {
//!     let lines = tabfile::lines::read_lines(fs.open_read(path)?)?;
//!     Ok(lines.into_iter().next())
//! }
//! ```

use crate::errors::Result;
use crate::watch::{DeletionSignal, WatchOutcome};
use std::io::{BufRead, Write};
use std::path::Path;

/// File system operations trait.
///
/// Implementations must be `Send + Sync`: a delete-watch blocks one thread
/// while another thread deletes through the same file system.
pub trait FileSystem: Send + Sync {
    /// Open a file for buffered reading.
    ///
    /// # Errors
    ///
    /// Returns `FileUtilError::Io` if the file doesn't exist or can't be
    /// opened.
    fn open_read(&self, path: &Path) -> Result<Box<dyn BufRead + Send>>;

    /// Open a file for writing, truncating it unless `append` is set.
    /// The file is created if missing.
    ///
    /// # Errors
    ///
    /// Returns `FileUtilError::Io` if the parent directory doesn't exist or
    /// permission is denied.
    fn open_write(&self, path: &Path, append: bool) -> Result<Box<dyn Write + Send>>;

    /// Check if a path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create a directory and all missing parents. Succeeds if it exists.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create an empty file if nothing exists at `path`.
    ///
    /// Returns `true` if a file was created.
    fn create_file_if_absent(&self, path: &Path) -> Result<bool>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// Returns `FileUtilError::Io` with kind `NotFound` if it is missing.
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Copy the bytes of `from` into a new file `to`.
    ///
    /// # Errors
    ///
    /// Returns `FileUtilError::Io` with kind `AlreadyExists` if `to` exists.
    fn copy_new(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Names of the entries directly inside a directory.
    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>>;

    /// Register for deletion events on the parent directory of `path` and
    /// block for a single wake-up of `signal`.
    ///
    /// Callers go through [`crate::watch::block_on_file_deletion`], which
    /// handles the file-absent case first.
    fn wait_for_deletion(&self, path: &Path, signal: &DeletionSignal) -> Result<WatchOutcome>;
}
