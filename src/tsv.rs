//! Tab-separated line parsing into maps.
//!
//! Two builders are provided:
//!
//! - [`KeyValueBuilder`]: two-column lines into `HashMap<String, String>`
//! - [`KeyListBuilder`]: rows into `HashMap<String, Vec<String>>`, keyed on
//!   a configurable column
//!
//! Both accept lines one at a time so they can be driven from a reader
//! ([`read_map`], [`read_map_list`]) or from an in-memory line sequence
//! ([`map_from_lines`], [`map_list_from_lines`]). A failed parse returns the
//! error only; the partially built map is dropped.
//!
//! There is no quoting: a tab inside a value is a field boundary.
//!
//! # Example
//!
//! ```rust
//! use tabfile::tsv::{map_list_from_lines, MapListOptions};
//!
//! let map = map_list_from_lines(["a\tx\ty", "a\tz"], &MapListOptions::default()).unwrap();
//! assert_eq!(map["a"], vec!["x", "y", "z"]);
//! ```

use crate::errors::{FileUtilError, Result};
use crate::lines::for_each_line;
use crate::progress::{NoProgress, Progress};
use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;

/// Split a line on tabs.
///
/// A line without tabs is a single field, even when empty. Otherwise trailing
/// empty fields are dropped, so `"a\t"` is `["a"]` and `"\t"` has no fields
/// at all. Interior empty fields are kept.
pub fn split_fields(line: &str) -> Vec<&str> {
    if !line.contains('\t') {
        return vec![line];
    }
    let mut fields: Vec<&str> = line.split('\t').collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Builds a key → value map from two-column lines.
#[derive(Debug, Default)]
pub struct KeyValueBuilder {
    skip_errors: bool,
    skipped: usize,
    map: HashMap<String, String>,
}

impl KeyValueBuilder {
    /// With `skip_errors`, lines that are not exactly two fields are dropped
    /// instead of failing the parse.
    pub fn new(skip_errors: bool) -> Self {
        Self {
            skip_errors,
            ..Self::default()
        }
    }

    /// Add one line. The last value for a repeated key wins.
    pub fn push_line(&mut self, line_number: usize, line: &str) -> Result<()> {
        let fields = split_fields(line);
        if fields.len() != 2 {
            if self.skip_errors {
                self.skipped += 1;
                log::debug!("Skipping malformed line {}: {:?}", line_number, line);
                return Ok(());
            }
            return Err(FileUtilError::format(
                format!("expected 2 tab-separated fields, found {}", fields.len()),
                line,
                line_number,
            ));
        }
        self.map.insert(fields[0].to_string(), fields[1].to_string());
        Ok(())
    }

    #[cfg(test)]
    fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> HashMap<String, String> {
        if self.skipped > 0 {
            log::warn!("Skipped {} malformed TSV lines", self.skipped);
        }
        self.map
    }
}

/// Predicate over a row's fields; returning `true` excludes the row.
pub type LineFilter<'a> = Box<dyn Fn(&[&str]) -> bool + 'a>;

/// Options for [`KeyListBuilder`].
pub struct MapListOptions<'a> {
    /// Column holding the key. Defaults to 0.
    pub key_index: usize,
    /// Replace the list for a key on every row instead of accumulating.
    pub overwrite: bool,
    /// Rows for which this returns `true` are skipped before keying.
    pub filter: Option<LineFilter<'a>>,
}

impl Default for MapListOptions<'_> {
    fn default() -> Self {
        Self {
            key_index: 0,
            overwrite: false,
            filter: None,
        }
    }
}

impl fmt::Debug for MapListOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapListOptions")
            .field("key_index", &self.key_index)
            .field("overwrite", &self.overwrite)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl<'a> MapListOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_index(mut self, key_index: usize) -> Self {
        self.key_index = key_index;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Exclude rows for which `filter` returns `true`.
    pub fn filter(mut self, filter: impl Fn(&[&str]) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }
}

/// Builds a key → values map from tab-separated rows.
///
/// With `key_index == 0`, every field after the key is appended to the key's
/// list. With any other key column only `fields[0]` is appended and the rest
/// of the row is ignored. That asymmetry is long-standing behavior that
/// callers depend on; it is kept as is even though it looks unintended.
#[derive(Debug)]
pub struct KeyListBuilder<'o, 'a> {
    options: &'o MapListOptions<'a>,
    map: HashMap<String, Vec<String>>,
}

impl<'o, 'a> KeyListBuilder<'o, 'a> {
    pub fn new(options: &'o MapListOptions<'a>) -> Self {
        Self {
            options,
            map: HashMap::new(),
        }
    }

    /// Add one row.
    ///
    /// # Errors
    ///
    /// Returns `FileUtilError::Format` if the row has no field at `key_index`.
    pub fn push_line(&mut self, line_number: usize, line: &str) -> Result<()> {
        let fields = split_fields(line);
        if let Some(filter) = &self.options.filter {
            if filter(fields.as_slice()) {
                return Ok(());
            }
        }

        let key_index = self.options.key_index;
        let key = fields.get(key_index).ok_or_else(|| {
            FileUtilError::format(
                format!(
                    "key index {} out of range for {} fields",
                    key_index,
                    fields.len()
                ),
                line,
                line_number,
            )
        })?;

        let list = if self.options.overwrite {
            let slot = self.map.entry((*key).to_string()).or_default();
            slot.clear();
            slot
        } else {
            self.map.entry((*key).to_string()).or_default()
        };

        if key_index == 0 {
            list.extend(fields[1..].iter().map(|f| f.to_string()));
        } else {
            list.push(fields[0].to_string());
        }
        Ok(())
    }

    pub fn finish(self) -> HashMap<String, Vec<String>> {
        self.map
    }
}

/// Build a key → value map from a line sequence.
pub fn map_from_lines<I, S>(lines: I, skip_errors: bool) -> Result<HashMap<String, String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = KeyValueBuilder::new(skip_errors);
    for (index, line) in lines.into_iter().enumerate() {
        builder.push_line(index + 1, line.as_ref())?;
    }
    Ok(builder.finish())
}

/// Build a key → values map from a line sequence.
pub fn map_list_from_lines<I, S>(
    lines: I,
    options: &MapListOptions<'_>,
) -> Result<HashMap<String, Vec<String>>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = KeyListBuilder::new(options);
    for (index, line) in lines.into_iter().enumerate() {
        builder.push_line(index + 1, line.as_ref())?;
    }
    Ok(builder.finish())
}

/// Stream `reader` into a key → value map.
pub fn read_map<R: BufRead>(reader: R, skip_errors: bool) -> Result<HashMap<String, String>> {
    read_map_with_progress(reader, skip_errors, NoProgress)
}

/// Like [`read_map`], ticking `progress` after each line.
pub fn read_map_with_progress<R: BufRead, P: Progress>(
    reader: R,
    skip_errors: bool,
    progress: P,
) -> Result<HashMap<String, String>> {
    let mut builder = KeyValueBuilder::new(skip_errors);
    for_each_line(reader, progress, |n, line| builder.push_line(n, &line))?;
    Ok(builder.finish())
}

/// Stream `reader` into a key → values map.
pub fn read_map_list<R: BufRead>(
    reader: R,
    options: &MapListOptions<'_>,
) -> Result<HashMap<String, Vec<String>>> {
    read_map_list_with_progress(reader, options, NoProgress)
}

/// Like [`read_map_list`], ticking `progress` after each line.
pub fn read_map_list_with_progress<R: BufRead, P: Progress>(
    reader: R,
    options: &MapListOptions<'_>,
    progress: P,
) -> Result<HashMap<String, Vec<String>>> {
    let mut builder = KeyListBuilder::new(options);
    for_each_line(reader, progress, |n, line| builder.push_line(n, &line))?;
    Ok(builder.finish())
}
