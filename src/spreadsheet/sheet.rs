use crate::error::TableSheetError;
use crate::spreadsheet::cell::RenderedCell;
use crate::spreadsheet::xlsx;
use std::fs::File;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;

/// A single worksheet ready to be packaged.
///
/// The grid is dense: every row holds one cell per column, and empty cells
/// still carry their styling.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedSheet {
    pub name: String,
    pub rows: Vec<Vec<RenderedCell>>,
    /// Width per column, in characters
    pub column_widths: Vec<usize>,
    pub show_grid_lines: bool,
}

impl RenderedSheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            rows: Vec::new(),
            column_widths: Vec::new(),
            show_grid_lines: false,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&RenderedCell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    pub fn cells(&self) -> impl Iterator<Item = &RenderedCell> {
        self.rows.iter().flatten()
    }

    /// Serializes the sheet as a single-sheet `.xlsx` package.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>, TableSheetError> {
        let cursor = xlsx::write_package(self, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Writes the sheet as a `.xlsx` file, creating or truncating `path`.
    pub fn write_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<(), TableSheetError> {
        let file = File::create(path)?;
        let mut writer = xlsx::write_package(self, BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}
