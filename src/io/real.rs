//! Production implementation of [`FileSystem`].
//!
//! Delegates to `std::fs` for file operations and to `notify` for the
//! deletion watch.
//!
//! ```rust,ignore
//! use tabfile::io::real::RealFileSystem;
//! use tabfile::io::traits::FileSystem;
//!
//! let fs = RealFileSystem::new();
//! let reader = fs.open_read(Path::new("ids.tsv"))?;
//! ```

use crate::errors::{FileUtilError, Result};
use crate::io::traits::FileSystem;
use crate::watch::{outcome_for, watch_dir, DeletionSignal, WatchOutcome};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Production file system implementation.
///
/// Stateless; every call opens and drops its own handles.
#[derive(Debug, Default, Clone)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Create a new real file system instance.
    pub fn new() -> Self {
        Self
    }
}

/// Events that take a name out of the watched directory: removal, or the
/// source side of a rename (`mv lock elsewhere/`).
fn is_deletion(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Name(RenameMode::From | RenameMode::Any))
    )
}

impl FileSystem for RealFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn BufRead + Send>> {
        let file = File::open(path).map_err(|e| FileUtilError::io_with_path(e, path))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn open_write(&self, path: &Path, append: bool) -> Result<Box<dyn Write + Send>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|e| FileUtilError::io_with_path(e, path))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| FileUtilError::io_with_path(e, path))
    }

    fn create_file_if_absent(&self, path: &Path) -> Result<bool> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(FileUtilError::io_with_path(e, path)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| FileUtilError::io_with_path(e, path))
    }

    fn copy_new(&self, from: &Path, to: &Path) -> Result<u64> {
        let mut source = File::open(from).map_err(|e| FileUtilError::io_with_path(e, from))?;
        // create_new keeps an existing destination intact.
        let mut dest = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(to)
            .map_err(|e| FileUtilError::io_with_path(e, to))?;
        io::copy(&mut source, &mut dest).map_err(|e| FileUtilError::io_with_path(e, to))
    }

    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(path).map_err(|e| FileUtilError::io_with_path(e, path))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FileUtilError::io_with_path(e, path))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn wait_for_deletion(&self, path: &Path, signal: &DeletionSignal) -> Result<WatchOutcome> {
        let dir = watch_dir(path);
        let armed = signal.arm();
        let events = signal.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_deletion(&event.kind) => events.notify_deleted(armed, event.paths),
            Ok(_) => {}
            Err(e) => log::warn!("Deletion watch error: {}", e),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        // Deleted between the caller's existence check and registration.
        if !path.exists() {
            return Ok(WatchOutcome::Deleted);
        }

        let wake = signal.wait_once();
        Ok(outcome_for(path, wake))
    }
}
