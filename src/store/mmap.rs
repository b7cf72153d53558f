//! Record Store - memory-mapped view of the log file
//!
//! Exposes the raw log as an immutable, randomly addressable byte buffer.
//! Lines are addressed by the byte offset of their first character; the
//! offset doubles as the record's identity everywhere else in the system.
//!
//! A memory map is used instead of a seekable reader because queries fetch
//! many non-sequential lines: with a map each fetch is a bounds-checked
//! slice, with no reposition or read syscall per lookup. Returned lines
//! borrow from the map and never outlive the store.

use crate::store::error::StoreResult;
use memchr::memchr;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Immutable, memory-mapped record store over one log file
///
/// The store is read-only and safe to share across query worker threads.
#[derive(Debug)]
pub struct RecordStore {
    /// None when the file is empty (zero-length maps are rejected by the OS)
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl RecordStore {
    /// Open a log file and map it into memory
    ///
    /// Fails with [`StoreError::Io`](crate::store::StoreError::Io) when the
    /// path is missing or unreadable.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // Safety: the file is opened read-only and treated as immutable
            // for the lifetime of the session.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total size of the backing file in bytes
    pub fn len(&self) -> u64 {
        self.data().len() as u64
    }

    /// Check if the backing file is empty
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Check if an offset is at or past the end of the file
    pub fn is_end(&self, offset: u64) -> bool {
        offset >= self.len()
    }

    /// Return the line beginning at `offset`, excluding the line feed
    ///
    /// The slice borrows from the memory map. An offset at or past the end
    /// of the file yields an empty slice; a blank line yields an empty
    /// slice as well (callers skip those during indexing, and no index
    /// entry ever points at one).
    pub fn line_at(&self, offset: u64) -> &[u8] {
        let data = self.data();
        if offset >= data.len() as u64 {
            return &[];
        }

        let start = offset as usize;
        match memchr(b'\n', &data[start..]) {
            Some(nl) => &data[start..start + nl],
            None => &data[start..],
        }
    }

    /// Iterate over all lines as `(offset, line)` pairs
    ///
    /// Blank lines are yielded with an empty slice so the indexing pass can
    /// account for them; the final line is yielded whether or not the file
    /// ends in a line feed.
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            data: self.data(),
            pos: 0,
        }
    }

    fn data(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

/// Iterator over `(offset, line)` pairs of a [`RecordStore`]
#[derive(Debug)]
pub struct Lines<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (u64, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data;
        if self.pos >= data.len() {
            return None;
        }

        let offset = self.pos as u64;
        let rest = &data[self.pos..];
        let line = match memchr(b'\n', rest) {
            Some(nl) => {
                self.pos += nl + 1;
                &rest[..nl]
            }
            None => {
                self.pos = data.len();
                rest
            }
        };

        Some((offset, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store_with(content: &[u8]) -> (NamedTempFile, RecordStore) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        let store = RecordStore::open(file.path()).unwrap();
        (file, store)
    }

    #[test]
    fn test_open_missing_file() {
        let result = RecordStore::open("/nonexistent/clicks.txt");
        assert!(matches!(
            result,
            Err(crate::store::StoreError::Io(_))
        ));
    }

    #[test]
    fn test_open_empty_file() {
        let (_file, store) = store_with(b"");
        assert!(store.is_empty());
        assert!(store.is_end(0));
        assert_eq!(store.line_at(0), b"");
        assert_eq!(store.lines().count(), 0);
    }

    #[test]
    fn test_line_at_boundaries() {
        let (_file, store) = store_with(b"first\nsecond\nthird\n");

        assert_eq!(store.line_at(0), b"first");
        assert_eq!(store.line_at(6), b"second");
        assert_eq!(store.line_at(13), b"third");
        assert!(store.is_end(19));
        assert_eq!(store.line_at(19), b"");
    }

    #[test]
    fn test_line_at_no_trailing_newline() {
        let (_file, store) = store_with(b"first\nlast");
        assert_eq!(store.line_at(6), b"last");
    }

    #[test]
    fn test_lines_offsets() {
        let (_file, store) = store_with(b"aa\nbbb\n\ncc");
        let lines: Vec<(u64, &[u8])> = store.lines().collect();

        assert_eq!(
            lines,
            vec![
                (0, b"aa".as_ref()),
                (3, b"bbb".as_ref()),
                (7, b"".as_ref()),
                (8, b"cc".as_ref()),
            ]
        );
    }

    #[test]
    fn test_blank_line_lookup_is_not_an_error() {
        let (_file, store) = store_with(b"aa\n\nbb\n");
        assert_eq!(store.line_at(3), b"");
    }
}
