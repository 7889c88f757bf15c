//! Error types for tabfile operations.
//!
//! Every fallible operation in the crate returns [`FileUtilError`]. The
//! variants map onto the failure categories callers care about:
//!
//! - `Io`: the underlying read/write/open/delete failed; propagated as-is
//! - `Format`: a TSV line did not have the expected shape (strict mode)
//! - `Parse`: a line could not be parsed as a number
//! - `AlreadyExists`: a directory that must be fresh is already present
//! - `Config`: a configuration file could not be understood
//!
//! # Example
//!
//! ```rust
//! use tabfile::errors::FileUtilError;
//!
//! let err = FileUtilError::format("expected two columns", "a\tb\tc", 3);
//! assert_eq!(err.category(), "Format");
//! assert_eq!(err.line(), Some("a\tb\tc"));
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// Convenience alias used throughout the crate.
pub type Result<T, E = FileUtilError> = std::result::Result<T, E>;

/// Unified error type for tabfile operations.
#[derive(Debug, thiserror::Error)]
pub enum FileUtilError {
    /// File system I/O errors (read, write, permissions, etc.)
    #[error("I/O error: {message}{}", display_path(.path))]
    Io {
        message: String,
        path: Option<PathBuf>,
        kind: io::ErrorKind,
    },

    /// A TSV line did not match the expected column layout.
    #[error("Format error: {message} at line {line_number}: {line:?}")]
    Format {
        message: String,
        line: String,
        line_number: usize,
    },

    /// A line could not be parsed into a value.
    #[error("Parse error: {message} at line {line_number}: {line:?}")]
    Parse {
        message: String,
        line: String,
        line_number: usize,
    },

    /// A path that was required not to exist already does.
    #[error("Already exists: {}", .path.display())]
    AlreadyExists { path: PathBuf },

    /// Configuration file errors
    #[error("Config error: {message}{}", display_path(.path))]
    Config {
        message: String,
        path: Option<PathBuf>,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" (path: {})", p.display()),
        None => String::new(),
    }
}

impl FileUtilError {
    /// Create an I/O error with a message.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            kind: io::ErrorKind::Other,
        }
    }

    /// Wrap a `std::io::Error` with the path it happened on.
    pub fn io_with_path(err: io::Error, path: impl AsRef<Path>) -> Self {
        Self::Io {
            message: err.to_string(),
            path: Some(path.as_ref().to_path_buf()),
            kind: err.kind(),
        }
    }

    /// Create an I/O error of a specific kind, e.g. `NotFound` from the fake
    /// file system.
    pub fn io_kind(kind: io::ErrorKind, message: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.as_ref().to_path_buf()),
            kind,
        }
    }

    /// Create a format error for an offending TSV line.
    pub fn format(message: impl Into<String>, line: impl Into<String>, line_number: usize) -> Self {
        Self::Format {
            message: message.into(),
            line: line.into(),
            line_number,
        }
    }

    /// Create a parse error for an offending line.
    pub fn parse(message: impl Into<String>, line: impl Into<String>, line_number: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line: line.into(),
            line_number,
        }
    }

    pub fn already_exists(path: impl AsRef<Path>) -> Self {
        Self::AlreadyExists {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a configuration error with path context.
    pub fn config_with_path(message: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Attach a path to an I/O error that was raised without one.
    ///
    /// Line readers only see a `BufRead`, so the path is filled in by the
    /// caller that opened the file.
    pub fn with_path(self, new_path: impl AsRef<Path>) -> Self {
        match self {
            Self::Io {
                message,
                path: None,
                kind,
            } => Self::Io {
                message,
                path: Some(new_path.as_ref().to_path_buf()),
                kind,
            },
            other => other,
        }
    }

    /// Get the associated path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::Config { path, .. } => path.as_deref(),
            Self::AlreadyExists { path } => Some(path),
            Self::Format { .. } | Self::Parse { .. } => None,
        }
    }

    /// Get the offending line for format and parse errors.
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::Format { line, .. } | Self::Parse { line, .. } => Some(line),
            _ => None,
        }
    }

    /// Get the underlying I/O error kind, if this is an I/O error.
    pub fn io_kind_of(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io { .. } => "I/O",
            Self::Format { .. } => "Format",
            Self::Parse { .. } => "Parse",
            Self::AlreadyExists { .. } => "AlreadyExists",
            Self::Config { .. } => "Config",
        }
    }
}

impl From<io::Error> for FileUtilError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
            kind: err.kind(),
        }
    }
}

impl From<notify::Error> for FileUtilError {
    fn from(err: notify::Error) -> Self {
        let paths = err.paths.first().cloned();
        let kind = match &err.kind {
            notify::ErrorKind::Io(io_err) => io_err.kind(),
            notify::ErrorKind::PathNotFound => io::ErrorKind::NotFound,
            _ => io::ErrorKind::Other,
        };
        Self::Io {
            message: format!("watch failed: {}", err),
            path: paths,
            kind,
        }
    }
}
