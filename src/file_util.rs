//! Path-based file helpers over an injectable [`FileSystem`].
//!
//! [`FileUtil`] is the entry point most callers want. It opens files through
//! its file system, hands the readers to [`crate::lines`] and [`crate::tsv`],
//! and fills in path context on errors.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tabfile::FileUtil;
//!
//! let util = FileUtil::new().with_log_every(100_000);
//! let ids = util.read_map_from_tsv_file(Path::new("ids.tsv"), false)?;
//! util.write_lines_to_file(Path::new("keys.txt"), &ids.keys().collect::<Vec<_>>())?;
//! # Ok::<(), tabfile::errors::FileUtilError>(())
//! ```

use crate::errors::{FileUtilError, Result};
use crate::io::{FileSystem, RealFileSystem};
use crate::lines::{self, for_each_line};
use crate::progress::{LogEvery, Progress};
use crate::tsv::{self, MapListOptions};
use crate::watch::{self, DeletionSignal, WatchOutcome};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

/// Append the platform separator to `dir` unless it already ends with one.
pub fn add_directory_separator_if_necessary(dir: &str) -> String {
    if dir.ends_with(MAIN_SEPARATOR_STR) {
        dir.to_string()
    } else {
        format!("{}{}", dir, MAIN_SEPARATOR_STR)
    }
}

/// Line-oriented file helpers bound to a file system.
#[derive(Debug, Clone)]
pub struct FileUtil<F: FileSystem = RealFileSystem> {
    fs: F,
    log_every: usize,
}

impl FileUtil<RealFileSystem> {
    /// Helpers over the real file system.
    pub fn new() -> Self {
        Self::with_fs(RealFileSystem::new())
    }
}

impl Default for FileUtil<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> FileUtil<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs, log_every: 0 }
    }

    /// Log progress every `frequency` lines on path-based reads. Zero turns
    /// progress logging off.
    pub fn with_log_every(mut self, frequency: usize) -> Self {
        self.log_every = frequency;
        self
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    fn progress_for(&self, path: &Path) -> LogEvery {
        LogEvery::new(self.log_every).with_label(path.display().to_string())
    }

    pub fn file_exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    /// Create `path` and any missing parents. Succeeds if it already exists.
    pub fn mkdirs(&self, path: &Path) -> Result<()> {
        self.fs.create_dir_all(path)
    }

    /// Create a fresh output directory.
    ///
    /// The directory name gets a trailing separator. Fails with
    /// `FileUtilError::AlreadyExists` if anything exists there; the caller
    /// decides whether that ends the process.
    pub fn mkdir_or_die_checked(&self, dir: &str) -> Result<PathBuf> {
        let dir = PathBuf::from(add_directory_separator_if_necessary(dir));
        if self.fs.exists(&dir) {
            return Err(FileUtilError::already_exists(&dir));
        }
        self.fs.create_dir_all(&dir)?;
        log::debug!("Created output directory {}", dir.display());
        Ok(dir)
    }

    /// Entry names in `path`, sorted. Empty if `path` is not a directory.
    pub fn list_directory_contents(&self, path: &Path) -> Result<Vec<String>> {
        if !self.fs.is_dir(path) {
            return Ok(Vec::new());
        }
        let mut names = self.fs.read_dir_names(path)?;
        names.sort();
        Ok(names)
    }

    /// Create an empty file unless something already exists at `path`.
    pub fn touch_file(&self, path: &Path) -> Result<()> {
        self.fs.create_file_if_absent(path).map(|_| ())
    }

    pub fn delete_file(&self, path: &Path) -> Result<()> {
        self.fs.remove_file(path)
    }

    /// Byte copy of `from` to `to`. Fails if `to` already exists.
    pub fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.fs.copy_new(from, to)
    }

    pub fn open_reader(&self, path: &Path) -> Result<Box<dyn BufRead + Send>> {
        self.fs.open_read(path)
    }

    pub fn open_writer(&self, path: &Path, append: bool) -> Result<Box<dyn Write + Send>> {
        self.fs.open_write(path, append)
    }

    pub fn read_lines_from_file(&self, path: &Path) -> Result<Vec<String>> {
        self.read_lines_from_file_with_progress(path, self.progress_for(path))
    }

    pub fn read_lines_from_file_with_progress<P: Progress>(
        &self,
        path: &Path,
        progress: P,
    ) -> Result<Vec<String>> {
        let reader = self.fs.open_read(path)?;
        lines::read_lines_with_progress(reader, progress).map_err(|e| e.with_path(path))
    }

    /// Truncate `path` and write each line followed by `\n`.
    pub fn write_lines_to_file<S: AsRef<str>>(&self, path: &Path, lines: &[S]) -> Result<()> {
        let writer = self.fs.open_write(path, false)?;
        lines::write_lines(writer, lines).map_err(|e| e.with_path(path))
    }

    /// Append each line followed by `\n` to `path`, creating it if needed.
    pub fn append_lines_to_file<S: AsRef<str>>(&self, path: &Path, lines: &[S]) -> Result<()> {
        let writer = self.fs.open_write(path, true)?;
        lines::write_lines(writer, lines).map_err(|e| e.with_path(path))
    }

    /// Copy lines from `reader` to `writer`. `writer` stays open.
    pub fn copy_lines<R: BufRead, W: Write + ?Sized>(&self, reader: R, writer: &mut W) -> Result<usize> {
        lines::copy_lines(reader, writer)
    }

    /// Parse a two-column TSV file into a map.
    pub fn read_map_from_tsv_file(
        &self,
        path: &Path,
        skip_errors: bool,
    ) -> Result<HashMap<String, String>> {
        let reader = self.fs.open_read(path)?;
        tsv::read_map_with_progress(reader, skip_errors, self.progress_for(path))
            .map_err(|e| e.with_path(path))
    }

    /// Parse a TSV file into a key → values map.
    pub fn read_map_list_from_tsv_file(
        &self,
        path: &Path,
        options: &MapListOptions<'_>,
    ) -> Result<HashMap<String, Vec<String>>> {
        let reader = self.fs.open_read(path)?;
        tsv::read_map_list_with_progress(reader, options, self.progress_for(path))
            .map_err(|e| e.with_path(path))
    }

    /// One floating point value per line.
    ///
    /// # Errors
    ///
    /// Returns `FileUtilError::Parse` naming the first line that is not a
    /// number.
    pub fn read_double_list_from_file(&self, path: &Path) -> Result<Vec<f64>> {
        let reader = self.fs.open_read(path)?;
        let mut values = Vec::new();
        for_each_line(reader, self.progress_for(path), |n, line| {
            let value = line.trim().parse::<f64>().map_err(|e| {
                FileUtilError::parse(format!("not a number ({})", e), line.as_str(), n)
            })?;
            values.push(value);
            Ok(())
        })
        .map_err(|e| e.with_path(path))?;
        Ok(values)
    }

    /// Block until `path` is deleted or another deletion is seen in its
    /// directory. Returns at once if `path` does not exist.
    pub fn block_on_file_deletion(&self, path: &Path) -> Result<WatchOutcome> {
        self.block_on_file_deletion_with(path, &DeletionSignal::new())
    }

    /// Like [`Self::block_on_file_deletion`], also returning when `signal` is
    /// interrupted.
    pub fn block_on_file_deletion_with(
        &self,
        path: &Path,
        signal: &DeletionSignal,
    ) -> Result<WatchOutcome> {
        watch::block_on_file_deletion(&self.fs, path, signal)
    }
}
