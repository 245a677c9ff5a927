//! # Cell Extractor
//!
//! Walks the markup of the first table in an HTML document into physical rows
//! of raw cells. Nothing here interprets the cells; span counts, styles and
//! links are captured verbatim (spans defaulted to 1) for the later stages.
use crate::helpers::string::normalize_whitespace;
use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub mod span;

/// Origin that renderer-relative links (`href="/Archives/..."`) point at.
pub const DEFAULT_BASE_URL: &str = "https://www.sec.gov";

/// Upper bound browsers apply to `colspan`; larger values are clamped.
const MAX_COLSPAN: usize = 1000;

/// Upper bound browsers apply to `rowspan`.
const MAX_ROWSPAN: usize = 65534;

/// Fatal extraction errors.
#[derive(Error, Debug)]
pub enum StructureError {
    #[error("No table found in HTML")]
    TableNotFound,
}

/// One `td`/`th` exactly as it appears in the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCell {
    /// Visible text, whitespace collapsed to single spaces
    pub text: String,
    /// Horizontal span, at least 1
    pub colspan: usize,
    /// Vertical span, at least 1
    pub rowspan: usize,
    /// Raw `style` attribute
    pub style: String,
    /// Target of the first anchor in the cell, resolved against the base origin
    pub link: Option<String>,
}

impl RawCell {
    /// Creates a single-slot cell with no style or link.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            colspan: 1,
            rowspan: 1,
            style: String::new(),
            link: None,
        }
    }

    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan.max(1);
        self
    }

    pub fn with_rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = rowspan.max(1);
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.style = style.to_owned();
        self
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(link.to_owned());
        self
    }
}

/// Cells of one `tr`, in source order.
pub type PhysicalRow = Vec<RawCell>;

/// Settings for the extractor.
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Origin joined onto hrefs that start with `/`; `None` keeps them relative.
    pub base_url: Option<Url>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            base_url: Some(Url::parse(DEFAULT_BASE_URL).expect("Hardcode base url")),
        }
    }
}

impl ExtractOptions {
    /// Options with a custom base origin.
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Some(Url::parse(base_url)?),
        })
    }

    /// Resolves an anchor target. Empty targets count as no link.
    fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        match &self.base_url {
            Some(base) if href.starts_with('/') => match base.join(href) {
                Ok(url) => Some(url.to_string()),
                Err(error) => {
                    debug!("Keeping unresolvable link '{}': {}", href, error);
                    Some(href.to_owned())
                }
            },
            _ => Some(href.to_owned()),
        }
    }
}

/// Extracts the physical rows of the first table in the document.
///
/// # Errors
///
/// Returns [`StructureError::TableNotFound`] if the document has no `table` element.
pub fn extract_rows(html: &str, options: &ExtractOptions) -> Result<Vec<PhysicalRow>, StructureError> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").expect("Hardcode selector");
    let table = document
        .select(&table_selector)
        .next()
        .ok_or(StructureError::TableNotFound)?;

    let row_selector = Selector::parse("tr").expect("Hardcode selector");
    let anchor_selector = Selector::parse("a").expect("Hardcode selector");
    let rows = table
        .select(&row_selector)
        .filter(|row| owning_table(row).map(|owner| owner.id() == table.id()).unwrap_or(false))
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|element| matches!(element.value().name(), "td" | "th"))
                .map(|cell| extract_cell(cell, &anchor_selector, options))
                .collect::<PhysicalRow>()
        })
        .collect::<Vec<_>>();
    debug!("Extracted {} physical rows", rows.len());
    Ok(rows)
}

/// Returns the outer HTML of every top-level table in the document, in order.
pub fn find_tables(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").expect("Hardcode selector");
    document
        .select(&table_selector)
        .filter(|table| owning_table(table).is_none())
        .map(|table| table.html())
        .collect()
}

/// Nearest `table` ancestor of an element.
fn owning_table<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn extract_cell(cell: ElementRef<'_>, anchor_selector: &Selector, options: &ExtractOptions) -> RawCell {
    let element = cell.value();
    let link = cell
        .select(anchor_selector)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .and_then(|href| options.resolve_link(href));
    RawCell {
        text: normalize_whitespace(&cell.text().collect::<String>()),
        colspan: parse_span(element.attr("colspan"), MAX_COLSPAN),
        rowspan: parse_span(element.attr("rowspan"), MAX_ROWSPAN),
        style: element.attr("style").unwrap_or_default().to_owned(),
        link,
    }
}

/// Span attribute value; absent, non-numeric or zero spans count as 1.
fn parse_span(value: Option<&str>, limit: usize) -> usize {
    value
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|span| *span > 0)
        .map(|span| span.min(limit))
        .unwrap_or(1)
}
