use crate::spreadsheet::reference::index_to_reference;
use std::fmt::Display;

/// Value stored in a rendered cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => write!(f, "{}", text),
            CellValue::Number(number) => write!(f, "{}", number),
        }
    }
}

/// Solid background fill, as an `RRGGBB` hex color.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fill {
    pub color: String,
}

impl Fill {
    pub fn solid(color: &str) -> Self {
        Self { color: color.to_owned() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Font {
    pub bold: bool,
    /// Single underline
    pub underline: bool,
    /// `RRGGBB` hex color, `None` for the theme text color
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    Center,
    /// Centered across the run of adjacent cells sharing this alignment
    CenterContinuous,
}

impl HorizontalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::CenterContinuous => "centerContinuous",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Center,
}

impl VerticalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Center => "center",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
    pub indent: u32,
}

impl Alignment {
    pub fn is_default(&self) -> bool {
        *self == Alignment::default()
    }
}

/// Everything about a cell's look that goes into one `xf` record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    pub number_format: Option<String>,
    pub fill: Option<Fill>,
    pub font: Font,
    pub alignment: Alignment,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == CellStyle::default()
    }
}

/// One cell of a [`crate::spreadsheet::RenderedSheet`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedCell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    pub value: CellValue,
    pub style: CellStyle,
    pub hyperlink: Option<String>,
}

impl RenderedCell {
    pub fn new(row: usize, col: usize, value: CellValue) -> Self {
        Self {
            row,
            col,
            value,
            ..RenderedCell::default()
        }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    pub fn number_format(&self) -> Option<&str> {
        self.style.number_format.as_deref()
    }

    pub fn fill(&self) -> Option<&Fill> {
        self.style.fill.as_ref()
    }

    pub fn font(&self) -> &Font {
        &self.style.font
    }

    pub fn alignment(&self) -> &Alignment {
        &self.style.alignment
    }
}
