//! Persistent command history.
//!
//! One submitted line per record, newline-delimited, append-only. The file is
//! read once at startup and kept open in append mode for the session.

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read all history lines from `path`.
///
/// A missing or unreadable file yields an empty history.
pub fn load(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let lines: Vec<String> = contents
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect();
            debug!("Loaded {} history entries from {}", lines.len(), path.display());
            lines
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            warn!("Ignoring unreadable history file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Append handle on the history file.
pub struct HistoryStore {
    path: PathBuf,
    file: File,
}

impl HistoryStore {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::File {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line and flush it before returning.
    ///
    /// Embedded newlines are replaced by spaces to keep one entry per line.
    pub fn append(&mut self, line: &str) -> Result<()> {
        let record = line.replace(['\r', '\n'], " ");
        writeln!(self.file, "{record}")
            .and_then(|_| self.file.flush())
            .map_err(|source| Error::File {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".oracli_history");

        let mut store = HistoryStore::open(&path).unwrap();
        store.append("select 1").unwrap();
        store.append("select 2").unwrap();

        assert_eq!(load(&path), vec!["select 1", "select 2"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn test_load_directory_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).is_empty());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        HistoryStore::open(&path).unwrap().append("desc emp").unwrap();
        HistoryStore::open(&path).unwrap().append("\\x").unwrap();

        assert_eq!(load(&path), vec!["desc emp", "\\x"]);
    }

    #[test]
    fn test_multiline_entry_stays_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        let mut store = HistoryStore::open(&path).unwrap();
        store.append("select *\nfrom dual").unwrap();

        assert_eq!(load(&path), vec!["select * from dual"]);
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/history");
        let err = HistoryStore::open(&path).err().unwrap();
        assert!(matches!(err, Error::File { .. }));
    }
}
