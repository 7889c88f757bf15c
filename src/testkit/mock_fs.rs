//! In-memory [`FileSystem`] for tests.
//!
//! [`MemoryFileSystem`] keeps files and directories in memory and delivers
//! deletion events to waiting delete-watches itself, so watch behavior can be
//! tested without timing on real file-system notifications.
//!
//! # Thread Safety
//!
//! `MemoryFileSystem` is `Send + Sync + Clone`. Clones share state through
//! `Arc<RwLock<_>>`, so one thread can block on a delete-watch while another
//! deletes the file through its clone.

use crate::errors::{FileUtilError, Result};
use crate::io::traits::FileSystem;
use crate::watch::{outcome_for, watch_dir, DeletionSignal, WatchOutcome};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead, Cursor, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    watches: Vec<Registration>,
    next_watch_id: u64,
}

#[derive(Debug)]
struct Registration {
    id: u64,
    dir: PathBuf,
    signal: DeletionSignal,
    generation: u64,
}

impl State {
    fn is_dir(&self, path: &Path) -> bool {
        if self.files.contains_key(path) {
            return false;
        }
        self.dirs.contains(path)
            || self
                .files
                .keys()
                .chain(self.dirs.iter())
                .any(|p| p != path && p.starts_with(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.is_dir(path)
    }

    fn parent_missing(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => !self.is_dir(parent),
            _ => false,
        }
    }
}

/// In-memory file system with a fluent builder API.
///
/// # Example
///
/// ```rust
/// use tabfile::testkit::MemoryFileSystem;
/// use tabfile::FileUtil;
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new()
///     .with_file("data/ids.tsv", "a\t1\nb\t2\n")
///     .with_dir("out");
///
/// let util = FileUtil::with_fs(fs);
/// let map = util.read_map_from_tsv_file(Path::new("data/ids.tsv"), false).unwrap();
/// assert_eq!(map["b"], "2");
/// ```
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    state: Arc<RwLock<State>>,
}

impl MemoryFileSystem {
    /// Create an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories implicitly.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.state
            .write()
            .expect("Lock poisoned")
            .files
            .insert(path.into(), content.into().into_bytes());
        self
    }

    /// Add multiple files at once.
    pub fn with_files<'a>(mut self, files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (path, content) in files {
            self = self.with_file(path, content);
        }
        self
    }

    /// Add an (empty) directory.
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.state
            .write()
            .expect("Lock poisoned")
            .dirs
            .insert(path.into());
        self
    }

    /// Check if a regular file exists.
    pub fn has_file(&self, path: impl AsRef<Path>) -> bool {
        self.state
            .read()
            .expect("Lock poisoned")
            .files
            .contains_key(path.as_ref())
    }

    /// Contents of a file as UTF-8, if it exists.
    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state
            .read()
            .expect("Lock poisoned")
            .files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// All file paths, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.state
            .read()
            .expect("Lock poisoned")
            .files
            .keys()
            .cloned()
            .collect()
    }

    /// Number of delete-watches currently blocked on `dir`.
    pub fn watch_count(&self, dir: impl AsRef<Path>) -> usize {
        self.state
            .read()
            .expect("Lock poisoned")
            .watches
            .iter()
            .filter(|w| w.dir == dir.as_ref())
            .count()
    }
}

impl std::fmt::Debug for MemoryFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (file_count, dir_count) = self
            .state
            .read()
            .map(|s| (s.files.len(), s.dirs.len()))
            .unwrap_or((0, 0));
        f.debug_struct("MemoryFileSystem")
            .field("file_count", &file_count)
            .field("dir_count", &dir_count)
            .finish_non_exhaustive()
    }
}

/// Buffers writes and commits them to the file map on flush and drop.
struct MemoryWriter {
    state: Arc<RwLock<State>>,
    path: PathBuf,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| io::Error::other("Lock poisoned"))?;
        state.files.insert(self.path.clone(), self.buffer.clone());
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

fn not_found(path: &Path) -> FileUtilError {
    FileUtilError::io_kind(io::ErrorKind::NotFound, "No such file or directory", path)
}

impl FileSystem for MemoryFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn BufRead + Send>> {
        let bytes = self
            .state
            .read()
            .expect("Lock poisoned")
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn open_write(&self, path: &Path, append: bool) -> Result<Box<dyn Write + Send>> {
        let mut state = self.state.write().expect("Lock poisoned");
        if state.parent_missing(path) {
            return Err(not_found(path));
        }
        if state.is_dir(path) {
            return Err(FileUtilError::io_kind(
                io::ErrorKind::IsADirectory,
                "Is a directory",
                path,
            ));
        }
        let existing = state.files.entry(path.to_path_buf()).or_default();
        let buffer = if append {
            existing.clone()
        } else {
            existing.clear();
            Vec::new()
        };
        Ok(Box::new(MemoryWriter {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            buffer,
        }))
    }

    fn exists(&self, path: &Path) -> bool {
        self.state.read().expect("Lock poisoned").exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state.read().expect("Lock poisoned").is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.write().expect("Lock poisoned");
        if state.files.contains_key(path) {
            return Err(FileUtilError::io_kind(
                io::ErrorKind::AlreadyExists,
                "File exists",
                path,
            ));
        }
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if !matches!(component, Component::RootDir | Component::Prefix(_)) {
                state.dirs.insert(current.clone());
            }
        }
        Ok(())
    }

    fn create_file_if_absent(&self, path: &Path) -> Result<bool> {
        let mut state = self.state.write().expect("Lock poisoned");
        if state.exists(path) {
            return Ok(false);
        }
        if state.parent_missing(path) {
            return Err(not_found(path));
        }
        state.files.insert(path.to_path_buf(), Vec::new());
        Ok(true)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let signals: Vec<(DeletionSignal, u64)> = {
            let mut state = self.state.write().expect("Lock poisoned");
            if state.files.remove(path).is_none() {
                return Err(not_found(path));
            }
            let dir = watch_dir(path);
            state
                .watches
                .iter()
                .filter(|w| w.dir == dir)
                .map(|w| (w.signal.clone(), w.generation))
                .collect()
        };
        for (signal, generation) in signals {
            signal.notify_deleted(generation, vec![path.to_path_buf()]);
        }
        Ok(())
    }

    fn copy_new(&self, from: &Path, to: &Path) -> Result<u64> {
        let mut state = self.state.write().expect("Lock poisoned");
        let bytes = state.files.get(from).cloned().ok_or_else(|| not_found(from))?;
        if state.exists(to) {
            return Err(FileUtilError::io_kind(
                io::ErrorKind::AlreadyExists,
                "File exists",
                to,
            ));
        }
        if state.parent_missing(to) {
            return Err(not_found(to));
        }
        let len = bytes.len() as u64;
        state.files.insert(to.to_path_buf(), bytes);
        Ok(len)
    }

    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>> {
        let state = self.state.read().expect("Lock poisoned");
        if !state.is_dir(path) {
            return Err(not_found(path));
        }
        let names: BTreeSet<String> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .filter_map(|p| p.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn wait_for_deletion(&self, path: &Path, signal: &DeletionSignal) -> Result<WatchOutcome> {
        let id = {
            let mut state = self.state.write().expect("Lock poisoned");
            if !state.exists(path) {
                return Ok(WatchOutcome::Deleted);
            }
            let id = state.next_watch_id;
            state.next_watch_id += 1;
            state.watches.push(Registration {
                id,
                dir: watch_dir(path),
                signal: signal.clone(),
                generation: signal.arm(),
            });
            id
        };

        let wake = signal.wait_once();

        self.state
            .write()
            .expect("Lock poisoned")
            .watches
            .retain(|w| w.id != id);
        Ok(outcome_for(path, wake))
    }
}
