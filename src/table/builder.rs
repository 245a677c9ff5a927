//! Table model assembly: physical rows in, validated [`TableModel`] out.

use crate::html::span::resolve_vertical_spans;
use crate::html::span::RECEIVING_ROW;
use crate::html::PhysicalRow;
use crate::table::header::column_boundaries;
use crate::table::header::detect_layout;
use crate::table::normalize::normalize_row;
use crate::table::LogicalRow;
use crate::table::TableError;
use crate::table::TableModel;
use std::borrow::Cow;
use tracing::debug;

/// Runs span resolution, header detection and row normalization over the
/// physical rows of one table.
///
/// Detection looks at the rows as written; the corrected row 2 only feeds the
/// column boundaries and normalization.
pub fn build_model(rows: &[PhysicalRow]) -> Result<TableModel, TableError> {
    let layout = detect_layout(rows);
    let rows = match resolve_vertical_spans(rows) {
        Some(corrected) => {
            let mut rows = rows.to_vec();
            rows[RECEIVING_ROW] = corrected;
            Cow::Owned(rows)
        }
        None => Cow::Borrowed(rows),
    };

    let header_cells = rows.get(layout.header_row).map(Vec::as_slice).unwrap_or_default();
    let boundaries = column_boundaries(header_cells);
    debug!(
        "Header row {} ({:?}), processing from row {}, {} columns",
        layout.header_row,
        layout.rule,
        layout.start_row,
        boundaries.len()
    );

    let logical_rows = rows
        .iter()
        .enumerate()
        .skip(layout.start_row)
        .map(|(index, cells)| normalize_row(index, cells, &boundaries))
        .collect::<Vec<LogicalRow>>();
    let header_row_offset = layout.header_row_offset(logical_rows.len());
    TableModel::new(logical_rows, boundaries, header_row_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::RawCell;
    use crate::table::ColumnBoundary;

    #[test]
    fn two_row_header_with_rowspan() {
        let rows = vec![
            vec![RawCell::new("")],
            vec![RawCell::new("Revenue").with_rowspan(2), RawCell::new("2024").with_colspan(2)],
            vec![RawCell::new("Q1"), RawCell::new("Q2")],
            vec![RawCell::new("Products"), RawCell::new("22").with_colspan(2)],
        ];
        let model = build_model(&rows).unwrap();
        // row 0 has an empty first cell, so row 1 is the first labelled row and defines the columns
        assert_eq!(model.boundaries, vec![ColumnBoundary::new(0, 1), ColumnBoundary::new(1, 3)]);
        assert_eq!(model.rows[0].cells, vec!["Revenue", "2024"]);
        assert_eq!(model.rows[1].cells, vec!["Revenue", "Q1 Q2"]);
        assert_eq!(model.rows[2].cells, vec!["Products", "22"]);
        assert_eq!(model.rows[2].numbers[1].map(|n| n.value), Some(22.0));
        assert_eq!(model.header_row_offset, 2);
    }

    #[test]
    fn shaded_layout_uses_corrected_row_two() {
        let shaded = "background-color:#cceeff";
        let rows = vec![
            vec![RawCell::new("")],
            vec![RawCell::new("").with_rowspan(2), RawCell::new("Years Ended").with_colspan(4)],
            vec![RawCell::new("2024").with_colspan(2), RawCell::new("2023").with_colspan(2)],
            vec![RawCell::new(""), RawCell::new(""), RawCell::new(""), RawCell::new(""), RawCell::new("")],
            vec![
                RawCell::new("Revenue").with_style(shaded),
                RawCell::new("$").with_style(shaded),
                RawCell::new("1,000").with_style(shaded),
                RawCell::new("$").with_style(shaded),
                RawCell::new("900").with_style(shaded),
            ],
        ];
        let model = build_model(&rows).unwrap();
        assert_eq!(model.boundaries.len(), 3);
        assert_eq!(model.row_count, 4);
        assert_eq!(model.rows[1].cells, vec!["", "2024", "2023"]);
        assert_eq!(model.rows[3].cells, vec!["Revenue", "$ 1,000", "$ 900"]);
        assert_eq!(model.header_row_offset, 3);
    }

    #[test]
    fn blank_corner_rowspan_keeps_header_row_two() {
        let rows = vec![
            vec![RawCell::new("")],
            vec![RawCell::new("").with_rowspan(2), RawCell::new("Years Ended").with_colspan(4)],
            vec![RawCell::new("2024").with_colspan(2), RawCell::new("2023").with_colspan(2)],
            vec![
                RawCell::new("Revenue"),
                RawCell::new("$"),
                RawCell::new("1,000"),
                RawCell::new("$"),
                RawCell::new("900"),
            ],
        ];
        let model = build_model(&rows).unwrap();
        assert_eq!(
            model.boundaries,
            vec![ColumnBoundary::new(0, 1), ColumnBoundary::new(1, 3), ColumnBoundary::new(3, 5)]
        );
        assert_eq!(model.rows[0].cells, vec!["", "2024", "2023"]);
        assert_eq!(model.rows[1].cells, vec!["Revenue", "$ 1,000", "$ 900"]);
        assert_eq!(model.rows[1].numbers[1].map(|n| n.value), Some(1000.0));
    }

    #[test]
    fn every_row_matches_column_count() {
        let rows = vec![
            vec![RawCell::new("Label"), RawCell::new("A").with_colspan(2), RawCell::new("B")],
            vec![RawCell::new("x")],
            vec![RawCell::new("y"), RawCell::new("1"), RawCell::new("2"), RawCell::new("3"), RawCell::new("4")],
            vec![],
        ];
        let model = build_model(&rows).unwrap();
        for row in &model.rows {
            assert_eq!(row.cells.len(), model.column_count);
            assert_eq!(row.links.len(), model.column_count);
        }
        assert_eq!(model.rows[2].cells, vec!["y", "1 2", "3"]);
    }

    #[test]
    fn empty_table() {
        let model = build_model(&[]).unwrap();
        assert_eq!(model.row_count, 0);
        assert_eq!(model.column_count, 0);
        assert_eq!(model.header_row_offset, 0);
    }
}
