//! Result set rendering.
//!
//! Rendering is pure: it turns a [`ResultSet`] into text and leaves writing
//! it to the caller.

use crate::session::ResultSet;
use comfy_table::{presets, ContentArrangement, Table};
use std::fmt;

/// How result sets are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Bordered grid, one line per row.
    #[default]
    Table,
    /// One block per row, one `column: value` line per column.
    Expanded,
}

impl DisplayMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Table => DisplayMode::Expanded,
            DisplayMode::Expanded => DisplayMode::Table,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Table => f.write_str("table"),
            DisplayMode::Expanded => f.write_str("expand"),
        }
    }
}

/// Render a result set in the given mode.
///
/// The returned text ends with a newline unless it is empty.
pub fn render(result: &ResultSet, mode: DisplayMode) -> String {
    if result.columns().is_empty() {
        return String::new();
    }
    match mode {
        DisplayMode::Table => render_table(result),
        DisplayMode::Expanded => render_expanded(result),
    }
}

fn render_table(result: &ResultSet) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(result.columns());
    for row in result.rows() {
        table.add_row(row);
    }
    format!("{table}\n")
}

fn render_expanded(result: &ResultSet) -> String {
    let mut out = String::new();
    for (index, row) in result.rows().iter().enumerate() {
        out.push_str(&format!(
            "*************************** {index}. row ***************************\n"
        ));
        for (column, value) in result.columns().iter().zip(row) {
            out.push_str(&format!("{column}: {value}\n"));
        }
    }
    out
}
