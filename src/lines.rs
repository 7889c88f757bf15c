//! Line sequence reading, writing and copying.
//!
//! Readers consume their source and drop it before returning, on success and
//! on error alike. Line terminators (`\n` or `\r\n`) are stripped.

use crate::errors::Result;
use crate::progress::{NoProgress, Progress};
use std::io::{BufRead, Write};

/// Read every line of `reader`, in order.
///
/// An empty source yields an empty vector.
///
/// # Errors
///
/// Returns `FileUtilError::Io` if the source fails mid-read or contains
/// invalid UTF-8.
pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    read_lines_with_progress(reader, NoProgress)
}

/// Like [`read_lines`], ticking `progress` after each line.
pub fn read_lines_with_progress<R: BufRead, P: Progress>(
    reader: R,
    progress: P,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for_each_line(reader, progress, |_, line| {
        lines.push(line);
        Ok(())
    })?;
    Ok(lines)
}

/// Feed each line of `reader` to `f` along with its 1-based line number.
///
/// Stops at the first error from the reader or from `f`. Returns the number of
/// lines processed.
pub fn for_each_line<R, P, F>(reader: R, mut progress: P, mut f: F) -> Result<usize>
where
    R: BufRead,
    P: Progress,
    F: FnMut(usize, String) -> Result<()>,
{
    let mut count = 0;
    for line in reader.lines() {
        let line = line?;
        count += 1;
        f(count, line)?;
        progress.tick(count);
    }
    Ok(count)
}

/// Write each line followed by `\n`, then flush.
pub fn write_lines<W, S>(mut writer: W, lines: &[S]) -> Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for line in lines {
        writer.write_all(line.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Copy the lines of `reader` to `writer`, normalizing terminators to `\n`.
///
/// `writer` is borrowed and left open. Returns the number of lines copied.
pub fn copy_lines<R: BufRead, W: Write + ?Sized>(reader: R, writer: &mut W) -> Result<usize> {
    for_each_line(reader, NoProgress, |_, line| {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    })
}
