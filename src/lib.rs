//! # html2sheet
//!
//! Converts the semi-structured HTML tables found in financial filings into
//! formatted spreadsheets.
//!
//! Filing renderers lay tables out for the eye: header labels straddle
//! columns with `colspan`, a label in one header line spans down into the next
//! with `rowspan`, currency symbols sit in their own cells, and indentation is
//! inline CSS padding. This crate recovers the logical grid behind that markup
//! and writes it back out as an `.xlsx` sheet with equivalent formatting.
//!
//! ## Pipeline
//!
//! - [`html`]: cell extraction and the row 1 -> 2 rowspan correction
//! - [`table`]: header detection, row normalization, numeric classification,
//!   and the serializable [`TableModel`]
//! - [`spreadsheet`]: rendering to a styled grid and SpreadsheetML packaging
//! - [`batch`]: table discovery and multi-file conversion driven by a JSON config
//!
//! ```no_run
//! use html2sheet::RenderOptions;
//!
//! let html = std::fs::read_to_string("table0.html")?;
//! let model = html2sheet::parse(&html)?;
//! let sheet = html2sheet::render(&model, &RenderOptions::default().with_alternating_shading(true));
//! sheet.write_xlsx("table0.xlsx")?;
//! # Ok::<(), html2sheet::TableSheetError>(())
//! ```
pub mod batch;
pub mod error;
mod helpers;
pub mod html;
pub mod spreadsheet;
pub mod table;

pub use crate::error::TableSheetError;
pub use crate::html::ExtractOptions;
pub use crate::spreadsheet::RenderOptions;
pub use crate::spreadsheet::RenderedSheet;
pub use crate::table::TableModel;

use crate::html::extract_rows;
use crate::table::builder::build_model;

/// Parses the first table of `html` with the default extraction options.
pub fn parse(html: &str) -> Result<TableModel, TableSheetError> {
    parse_with(html, &ExtractOptions::default())
}

/// Parses the first table of `html` into a validated [`TableModel`].
///
/// # Errors
///
/// Fails with [`html::StructureError::TableNotFound`] when the document has no table.
pub fn parse_with(html: &str, options: &ExtractOptions) -> Result<TableModel, TableSheetError> {
    let rows = extract_rows(html, options)?;
    Ok(build_model(&rows)?)
}

/// Renders a model into a styled sheet. Never fails.
pub fn render(model: &TableModel, options: &RenderOptions) -> RenderedSheet {
    spreadsheet::render(model, options)
}

/// Parses, renders and packages one table, returning the `.xlsx` bytes.
pub fn convert(html: &str, extract: &ExtractOptions, options: &RenderOptions) -> Result<Vec<u8>, TableSheetError> {
    let model = parse_with(html, extract)?;
    render(&model, options).to_xlsx_bytes()
}
