//! # Spreadsheet Rendering Module
//!
//! Turns a [`crate::table::TableModel`] into a styled single-sheet workbook:
//! [`render`] maps the model onto a [`RenderedSheet`] grid, and
//! [`RenderedSheet::to_xlsx_bytes`] packages it as SpreadsheetML. The
//! [`xlsx::read_cells`] reader loads a package back for inspection.
use thiserror::Error;

pub mod cell;
pub mod format;
pub mod reference;
pub mod render;
pub mod sheet;
pub mod xlsx;

pub use cell::CellValue;
pub use cell::RenderedCell;
pub use render::render;
pub use sheet::RenderedSheet;

/// Default column width cap, in characters.
pub const DEFAULT_WIDTH_CAP: usize = 50;

/// Column width cap of the wide deployment profile.
pub const WIDE_WIDTH_CAP: usize = 70;

/// Errors raised while reading a package back.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing package part '{0}'")]
    MissingPart(String),

    #[error("Invalid cell reference '{0}'")]
    InvalidReference(String),

    #[error("Shared string index {0} is out of range")]
    SharedStringOutOfRange(usize),
}

/// Options controlling how a model is rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// URL attached to the top-left cell
    pub corner_hyperlink: Option<String>,
    /// Alternate gray and white fills from the model's header row offset
    pub alternating_shading: bool,
    /// Upper bound for every column width, in characters
    pub width_cap: usize,
    pub sheet_name: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            corner_hyperlink: None,
            alternating_shading: false,
            width_cap: DEFAULT_WIDTH_CAP,
            sheet_name: "Sheet1".to_owned(),
        }
    }
}

impl RenderOptions {
    /// Profile with wider columns.
    pub fn wide() -> Self {
        Self {
            width_cap: WIDE_WIDTH_CAP,
            ..Self::default()
        }
    }

    pub fn with_corner_hyperlink(mut self, url: &str) -> Self {
        self.corner_hyperlink = Some(url.to_owned());
        self
    }

    pub fn with_alternating_shading(mut self, enabled: bool) -> Self {
        self.alternating_shading = enabled;
        self
    }

    pub fn with_width_cap(mut self, width_cap: usize) -> Self {
        self.width_cap = width_cap;
        self
    }
}
