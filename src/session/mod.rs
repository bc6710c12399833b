//! Database session abstraction.
//!
//! The dispatcher talks to the database only through the [`Session`] trait:
//! - `query` for statements that return rows
//! - `execute` for DML and DDL
//! - `cancel` to abort whatever call is in flight
//! - `close` once, when the process is done with the connection

pub mod oracle;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::StatementError;
use async_trait::async_trait;
use std::borrow::Cow;

pub use self::oracle::OracleSession;

/// An open database connection.
#[async_trait]
pub trait Session: Send + Sync {
    /// Run a statement that returns rows.
    async fn query(&self, sql: &str) -> Result<ResultSet, StatementError>;

    /// Run a statement that does not return rows, returning the affected row count.
    async fn execute(&self, sql: &str) -> Result<u64, StatementError>;

    /// Abort the call currently in flight, if any.
    fn cancel(&self);

    /// Close the connection.
    async fn close(&self) -> Result<(), StatementError>;
}

/// A single value as delivered by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Text(String),
    Bytes(Vec<u8>),
}

impl Cell {
    /// Text shown for this value.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed("NULL"),
            Cell::Text(s) => Cow::Borrowed(s),
            Cell::Bytes(b) => String::from_utf8_lossy(b),
        }
    }
}

/// Column names plus rows of display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row of already formatted values.
    ///
    /// Every row must have one value per column.
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(
            row.len(),
            self.columns.len(),
            "row width does not match column count"
        );
        self.rows.push(row);
    }

    /// Append a row of driver cells.
    pub fn push_cells(&mut self, cells: &[Cell]) {
        self.push_row(cells.iter().map(|c| c.display().into_owned()).collect());
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Null.display(), "NULL");
        assert_eq!(Cell::Text("42".to_string()).display(), "42");
        assert_eq!(Cell::Bytes(b"abc".to_vec()).display(), "abc");
        assert_eq!(Cell::Bytes(vec![0x66, 0xff]).display(), "f\u{fffd}");
    }

    #[test]
    fn test_push_cells() {
        let mut rs = ResultSet::new(vec!["ID".to_string(), "NAME".to_string()]);
        rs.push_cells(&[Cell::Text("1".to_string()), Cell::Null]);
        assert_eq!(rs.rows(), &[vec!["1".to_string(), "NULL".to_string()]]);
        assert!(!rs.is_empty());
    }

    #[test]
    #[should_panic(expected = "row width")]
    #[cfg(debug_assertions)]
    fn test_row_width_mismatch_panics_in_debug() {
        let mut rs = ResultSet::new(vec!["A".to_string(), "B".to_string()]);
        rs.push_row(vec!["only one".to_string()]);
    }
}
