//! Testing infrastructure for tabfile.
//!
//! [`MemoryFileSystem`] implements [`FileSystem`](crate::io::FileSystem)
//! entirely in memory. Hand it to [`FileUtil::with_fs`](crate::FileUtil::with_fs)
//! to exercise file-handling code without touching disk:
//!
//! ```rust
//! use tabfile::testkit::MemoryFileSystem;
//! use tabfile::FileUtil;
//! use std::path::Path;
//!
//! let util = FileUtil::with_fs(MemoryFileSystem::new().with_file("n.txt", "1.5\n2.5\n"));
//! let values = util.read_double_list_from_file(Path::new("n.txt")).unwrap();
//! assert_eq!(values, vec![1.5, 2.5]);
//! ```

pub mod mock_fs;

pub use mock_fs::MemoryFileSystem;
