//! # Table Model
//!
//! The logical grid recovered from a ragged HTML table. [`TableModel`] is the
//! only thing the parsing side hands to the rendering side, so it is a plain
//! serde value that can be written to JSON, inspected, and loaded back.
//!
//! Every constructor validates the model; a value of this type always has
//! rectangular rows, a partitioning boundary list, and an in-range shading anchor.
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

pub mod builder;
pub mod header;
pub mod normalize;
pub mod numeric;

/// Model invariant violations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("Row {row} has {cells} cells, {links} links and {numbers} numeric slots, expected {expected}")]
    RaggedRow { row: usize, expected: usize, cells: usize, links: usize, numbers: usize },

    #[error("Declared {declared} {what} but found {actual}")]
    CountMismatch { what: &'static str, declared: usize, actual: usize },

    #[error("Header row offset {offset} is outside {row_count} rows")]
    HeaderOffsetOutOfRange { offset: usize, row_count: usize },

    #[error("Column boundary {index} starts at {start}, expected {expected}")]
    BoundaryGap { index: usize, start: usize, expected: usize },

    #[error("Column boundary {index} is empty ({start}..{end})")]
    EmptyBoundary { index: usize, start: usize, end: usize },

    #[error("Row {row} merges {width} columns from column {column}, past {column_count} columns")]
    MergeOutOfRange { row: usize, column: usize, width: usize, column_count: usize },
}

/// Half-open range of atomic columns that forms one logical column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBoundary {
    pub start: usize,
    pub end: usize,
}

impl ColumnBoundary {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of atomic columns covered.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the atomic range `[start, end)` shares at least one slot with this column.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// Display conventions found in a numeric cell's source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericCellFormat {
    pub has_currency: bool,
    pub has_percent: bool,
    pub has_thousands_separator: bool,
    pub is_parenthesized_negative: bool,
    pub decimal_places: u32,
}

/// A cell whose text parsed as a number.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericCell {
    /// Parsed value; percentages are already divided by 100
    pub value: f64,
    pub format: NumericCellFormat,
}

/// One physical row regrouped into logical columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalRow {
    /// Text per logical column
    pub cells: Vec<String>,
    /// First link found per logical column
    pub links: Vec<Option<String>>,
    /// Numeric reading per logical column, `None` for text
    #[serde(default)]
    pub numbers: Vec<Option<NumericCell>>,
    pub indent_level: u32,
    /// Left padding of the first cell, in points
    pub left_padding: u32,
    /// Single label spanning the whole row
    pub center_continuous: bool,
    /// Logical column index -> number of logical columns a label spans (always > 1)
    #[serde(default)]
    pub column_merges: BTreeMap<usize, usize>,
}

impl LogicalRow {
    fn validate(&self, row: usize, column_count: usize) -> Result<(), TableError> {
        if self.cells.len() != column_count || self.links.len() != column_count || self.numbers.len() != column_count {
            return Err(TableError::RaggedRow {
                row,
                expected: column_count,
                cells: self.cells.len(),
                links: self.links.len(),
                numbers: self.numbers.len(),
            });
        }
        for (&column, &width) in &self.column_merges {
            if width < 2 || column + width > column_count {
                return Err(TableError::MergeOutOfRange { row, column, width, column_count });
            }
        }
        Ok(())
    }
}

/// The parsed table: logical rows plus the layout facts the renderer needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableModel {
    pub rows: Vec<LogicalRow>,
    pub column_count: usize,
    pub row_count: usize,
    /// Index into `rows` where alternating shading starts
    pub header_row_offset: usize,
    /// Column schema the rows were grouped by
    #[serde(default)]
    pub boundaries: Vec<ColumnBoundary>,
}

impl TableModel {
    /// Builds a model, checking every invariant.
    pub fn new(rows: Vec<LogicalRow>, boundaries: Vec<ColumnBoundary>, header_row_offset: usize) -> Result<Self, TableError> {
        let model = Self {
            column_count: boundaries.len(),
            row_count: rows.len(),
            header_row_offset,
            rows,
            boundaries,
        };
        model.validate()?;
        Ok(model)
    }

    /// Checks row shape, boundary partitioning and the shading anchor.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.row_count != self.rows.len() {
            return Err(TableError::CountMismatch { what: "rows", declared: self.row_count, actual: self.rows.len() });
        }
        if !self.boundaries.is_empty() {
            if self.boundaries.len() != self.column_count {
                return Err(TableError::CountMismatch {
                    what: "columns",
                    declared: self.column_count,
                    actual: self.boundaries.len(),
                });
            }
            let mut expected = 0usize;
            for (index, boundary) in self.boundaries.iter().enumerate() {
                if boundary.start != expected {
                    return Err(TableError::BoundaryGap { index, start: boundary.start, expected });
                }
                if boundary.end <= boundary.start {
                    return Err(TableError::EmptyBoundary { index, start: boundary.start, end: boundary.end });
                }
                expected = boundary.end;
            }
        }
        let offset_in_range = match self.row_count {
            0 => self.header_row_offset == 0,
            row_count => self.header_row_offset < row_count,
        };
        if !offset_in_range {
            return Err(TableError::HeaderOffsetOutOfRange {
                offset: self.header_row_offset,
                row_count: self.row_count,
            });
        }
        for (index, row) in self.rows.iter().enumerate() {
            row.validate(index, self.column_count)?;
        }
        Ok(())
    }

    /// Total atomic columns covered by the boundary list.
    pub fn atomic_width(&self) -> usize {
        self.boundaries.last().map(|boundary| boundary.end).unwrap_or(0)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Loads a model from JSON and re-validates it.
    ///
    /// Rows saved without `numbers` are classified from their cell text.
    pub fn from_json(json: &str) -> Result<Self, crate::error::TableSheetError> {
        let mut model = serde_json::from_str::<TableModel>(json)?;
        for row in &mut model.rows {
            if row.numbers.is_empty() && !row.cells.is_empty() {
                row.numbers = row.cells.iter().map(|cell| numeric::classify(cell)).collect();
            }
        }
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> LogicalRow {
        LogicalRow {
            cells: cells.iter().map(|cell| cell.to_string()).collect(),
            links: vec![None; cells.len()],
            numbers: vec![None; cells.len()],
            ..LogicalRow::default()
        }
    }

    fn boundaries(widths: &[usize]) -> Vec<ColumnBoundary> {
        let mut start = 0;
        widths
            .iter()
            .map(|width| {
                let boundary = ColumnBoundary::new(start, start + width);
                start += width;
                boundary
            })
            .collect()
    }

    #[test]
    fn valid_model() {
        let model = TableModel::new(vec![row(&["a", "b"]), row(&["1", "2"])], boundaries(&[1, 3]), 1).unwrap();
        assert_eq!(model.column_count, 2);
        assert_eq!(model.row_count, 2);
        assert_eq!(model.atomic_width(), 4);
    }

    #[test]
    fn ragged_row_rejected() {
        let result = TableModel::new(vec![row(&["a", "b"]), row(&["1"])], boundaries(&[1, 1]), 0);
        assert!(matches!(result, Err(TableError::RaggedRow { row: 1, expected: 2, .. })));
    }

    #[test]
    fn offset_must_be_in_range() {
        let result = TableModel::new(vec![row(&["a"])], boundaries(&[1]), 1);
        assert_eq!(result, Err(TableError::HeaderOffsetOutOfRange { offset: 1, row_count: 1 }));
        assert!(TableModel::new(vec![], vec![], 0).is_ok());
    }

    #[test]
    fn boundaries_must_partition() {
        let mut model = TableModel::new(vec![row(&["a", "b"])], boundaries(&[2, 2]), 0).unwrap();
        model.boundaries[1].start = 3;
        assert_eq!(model.validate(), Err(TableError::BoundaryGap { index: 1, start: 3, expected: 2 }));
        model.boundaries[1] = ColumnBoundary::new(2, 2);
        assert_eq!(model.validate(), Err(TableError::EmptyBoundary { index: 1, start: 2, end: 2 }));
    }

    #[test]
    fn merges_must_fit() {
        let mut merged = row(&["a", "b", "c"]);
        merged.column_merges.insert(1, 3);
        let result = TableModel::new(vec![merged], boundaries(&[1, 1, 1]), 0);
        assert!(matches!(result, Err(TableError::MergeOutOfRange { column: 1, width: 3, .. })));
    }

    #[test]
    fn json_round_trip_keeps_merges_and_numbers() {
        let mut first = row(&["Segment", "", "$1.5"]);
        first.column_merges.insert(0, 2);
        first.numbers[2] = Some(NumericCell {
            value: 1.5,
            format: NumericCellFormat { has_currency: true, decimal_places: 1, ..NumericCellFormat::default() },
        });
        first.links[0] = Some("https://example.com".to_owned());
        let model = TableModel::new(vec![first], boundaries(&[1, 1, 1]), 0).unwrap();

        let json = model.to_json(false).unwrap();
        assert!(json.contains(r#""column_merges":{"0":2}"#));
        assert_eq!(TableModel::from_json(&json).unwrap(), model);
    }

    #[test]
    fn from_json_classifies_rows_without_numbers() {
        let json = r#"{"rows":[{"cells":["Sales","$1,200"],"links":[null,null],"indent_level":0,"left_padding":0,"center_continuous":false}],
                       "column_count":2,"row_count":1,"header_row_offset":0}"#;
        let model = TableModel::from_json(json).unwrap();
        assert_eq!(model.rows[0].numbers[0], None);
        let amount = model.rows[0].numbers[1].unwrap();
        assert_eq!(amount.value, 1200.0);
        assert!(amount.format.has_currency && amount.format.has_thousands_separator);
    }

    #[test]
    fn from_json_revalidates() {
        let json = r#"{"rows":[{"cells":["a"],"links":[],"indent_level":0,"left_padding":0,"center_continuous":false}],
                       "column_count":1,"row_count":1,"header_row_offset":0}"#;
        assert!(TableModel::from_json(json).is_err());
    }
}
