//! Row normalization: physical cells to logical columns.

use crate::helpers::style::left_padding;
use crate::html::span::MalformedSpanError;
use crate::html::RawCell;
use crate::table::numeric::classify;
use crate::table::ColumnBoundary;
use crate::table::LogicalRow;
use std::collections::BTreeMap;
use tracing::debug;
use tracing::warn;

/// Padding (pt) a first cell has at indent level 0.
const BASE_PADDING: u32 = 10;

/// Padding (pt) added per indent level.
const INDENT_STEP: u32 = 9;

/// Converts left padding to an indent level, rounding to the nearest step.
pub fn indent_level(padding: u32) -> u32 {
    if padding <= BASE_PADDING {
        0
    } else {
        (padding - BASE_PADDING + INDENT_STEP / 2) / INDENT_STEP
    }
}

/// A row is center-continuous when it is a single labelled cell spanning several columns.
pub fn is_center_continuous(cells: &[RawCell]) -> bool {
    match cells {
        [cell] => !cell.text.is_empty() && cell.colspan > 1,
        _ => false,
    }
}

/// One atomic column slot after expansion.
#[derive(Clone, Copy, Debug, Default)]
struct Slot<'a> {
    text: &'a str,
    link: Option<&'a str>,
}

/// Atomic placement of one physical cell.
struct Placement<'a> {
    cell: &'a RawCell,
    start: usize,
    end: usize,
}

/// Normalizes one physical row against the table's column schema.
///
/// `row` is the physical row index, used for diagnostics only.
pub fn normalize_row(row: usize, cells: &[RawCell], boundaries: &[ColumnBoundary]) -> LogicalRow {
    let width = boundaries.last().map(|boundary| boundary.end).unwrap_or(0);
    let placements = place_cells(row, cells, width);

    let mut slots = vec![Slot::default(); width];
    for placement in &placements {
        if let Some(slot) = slots.get_mut(placement.start) {
            *slot = Slot {
                text: &placement.cell.text,
                link: placement.cell.link.as_deref(),
            };
        }
    }

    let mut texts = Vec::<String>::with_capacity(boundaries.len());
    let mut links = Vec::<Option<String>>::with_capacity(boundaries.len());
    for boundary in boundaries {
        let group = &slots[boundary.start..boundary.end];
        let text = group
            .iter()
            .map(|slot| slot.text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        texts.push(text);
        links.push(group.iter().find_map(|slot| slot.link).map(str::to_owned));
    }

    let center_continuous = is_center_continuous(cells);
    let column_merges = if center_continuous {
        BTreeMap::new()
    } else {
        column_merges(row, &placements, boundaries)
    };
    let left_padding = cells.first().map(|cell| left_padding(&cell.style)).unwrap_or(0);

    LogicalRow {
        numbers: texts.iter().map(|text| classify(text)).collect(),
        cells: texts,
        links,
        indent_level: indent_level(left_padding),
        left_padding,
        center_continuous,
        column_merges,
    }
}

/// Lays cells out left to right on the atomic grid.
///
/// A cell whose span runs past the grid is treated as non-spanning; cells
/// starting past the grid are dropped.
fn place_cells(row: usize, cells: &[RawCell], width: usize) -> Vec<Placement<'_>> {
    let mut placements = Vec::with_capacity(cells.len());
    let mut position = 0usize;
    for cell in cells {
        let mut span = cell.colspan.max(1);
        if position < width && position + span > width && span > 1 {
            let error = MalformedSpanError {
                row,
                position: position + span,
                reached: width,
                reason: "span runs past the header width",
            };
            warn!("{}; treated as non-spanning", error);
            span = 1;
        }
        if position >= width {
            break;
        }
        placements.push(Placement { cell, start: position, end: position + span });
        position += span;
    }
    placements
}

/// Records labels that cross a logical column boundary.
fn column_merges(row: usize, placements: &[Placement<'_>], boundaries: &[ColumnBoundary]) -> BTreeMap<usize, usize> {
    let mut merges = BTreeMap::new();
    let mut covered_until = 0usize;
    for placement in placements.iter().filter(|placement| !placement.cell.text.is_empty()) {
        let mut touched = boundaries
            .iter()
            .enumerate()
            .filter(|(_, boundary)| boundary.overlaps(placement.start, placement.end))
            .map(|(index, _)| index);
        let Some(first) = touched.next() else { continue };
        let last = touched.last().unwrap_or(first);
        if last == first {
            continue;
        }
        if first < covered_until {
            debug!("Row {}: merge at column {} overlaps the previous merge; skipped", row, first);
            continue;
        }
        merges.insert(first, last - first + 1);
        covered_until = last + 1;
    }
    merges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::header::column_boundaries;

    fn schema(widths: &[usize]) -> Vec<ColumnBoundary> {
        let cells = widths.iter().map(|width| RawCell::new("h").with_colspan(*width)).collect::<Vec<_>>();
        column_boundaries(&cells)
    }

    #[test]
    fn indent_rounding() {
        assert_eq!(indent_level(0), 0);
        assert_eq!(indent_level(10), 0);
        assert_eq!(indent_level(14), 0);
        assert_eq!(indent_level(15), 1);
        assert_eq!(indent_level(19), 1);
        assert_eq!(indent_level(23), 1);
        assert_eq!(indent_level(24), 2);
        assert_eq!(indent_level(28), 2);
    }

    #[test]
    fn center_continuous_classification() {
        assert!(is_center_continuous(&[RawCell::new("Segment results").with_colspan(5)]));
        assert!(!is_center_continuous(&[RawCell::new("Segment results")]));
        assert!(!is_center_continuous(&[RawCell::new("").with_colspan(5)]));
        assert!(!is_center_continuous(&[RawCell::new("a").with_colspan(3), RawCell::new("b")]));
    }

    #[test]
    fn groups_slots_into_columns() {
        let boundaries = schema(&[1, 3, 3]);
        let cells = vec![
            RawCell::new("Net sales").with_style("padding: 0pt 0pt 0pt 19pt"),
            RawCell::new("$"),
            RawCell::new("1,234").with_link("https://example.com/n1"),
            RawCell::new(""),
            RawCell::new("$"),
            RawCell::new("(56)"),
        ];
        let row = normalize_row(5, &cells, &boundaries);
        assert_eq!(row.cells, vec!["Net sales", "$ 1,234", "$ (56)"]);
        assert_eq!(row.links, vec![None, Some("https://example.com/n1".to_owned()), None]);
        assert_eq!(row.left_padding, 19);
        assert_eq!(row.indent_level, 1);
        assert!(!row.center_continuous);
        assert!(row.column_merges.is_empty());
        assert_eq!(row.numbers[0], None);
        assert_eq!(row.numbers[1].map(|n| n.value), Some(1234.0));
        assert_eq!(row.numbers[2].map(|n| n.value), Some(-56.0));
    }

    #[test]
    fn short_rows_are_padded() {
        let boundaries = schema(&[1, 1, 1]);
        let row = normalize_row(0, &[RawCell::new("only")], &boundaries);
        assert_eq!(row.cells, vec!["only", "", ""]);
        assert_eq!(row.links.len(), 3);
        assert_eq!(row.numbers.len(), 3);
    }

    #[test]
    fn long_rows_are_truncated() {
        let boundaries = schema(&[1, 1]);
        let cells = vec![RawCell::new("a"), RawCell::new("b"), RawCell::new("c")];
        let row = normalize_row(0, &cells, &boundaries);
        assert_eq!(row.cells, vec!["a", "b"]);
    }

    #[test]
    fn overrunning_span_is_non_spanning() {
        let boundaries = schema(&[1, 1, 1]);
        let cells = vec![RawCell::new("x"), RawCell::new("Three months ended").with_colspan(9)];
        let row = normalize_row(0, &cells, &boundaries);
        assert_eq!(row.cells, vec!["x", "Three months ended", ""]);
        assert!(row.column_merges.is_empty());
    }

    #[test]
    fn full_width_label() {
        let boundaries = schema(&[1, 2, 2]);
        let row = normalize_row(0, &[RawCell::new("Segment A").with_colspan(5)], &boundaries);
        assert!(row.center_continuous);
        assert!(row.column_merges.is_empty());
        assert_eq!(row.cells, vec!["Segment A", "", ""]);
    }

    #[test]
    fn label_spanning_columns_is_merged() {
        let boundaries = schema(&[1, 3, 3, 3, 3]);
        let cells = vec![
            RawCell::new(""),
            RawCell::new("Three Months Ended").with_colspan(6),
            RawCell::new("Nine Months Ended").with_colspan(6),
        ];
        let row = normalize_row(2, &cells, &boundaries);
        assert_eq!(row.column_merges, BTreeMap::from([(1, 2), (3, 2)]));
        assert_eq!(row.cells, vec!["", "Three Months Ended", "", "Nine Months Ended", ""]);
    }

    #[test]
    fn empty_spanning_cell_is_not_merged() {
        let boundaries = schema(&[1, 2, 2]);
        let cells = vec![RawCell::new("Total"), RawCell::new("").with_colspan(4)];
        let row = normalize_row(0, &cells, &boundaries);
        assert!(row.column_merges.is_empty());
        assert_eq!(row.cells, vec!["Total", "", ""]);
    }

    #[test]
    fn overlapping_merges_keep_the_first() {
        let boundaries = schema(&[2, 2, 2]);
        let cells = vec![RawCell::new("A").with_colspan(3), RawCell::new("B").with_colspan(3)];
        let row = normalize_row(0, &cells, &boundaries);
        assert_eq!(row.column_merges, BTreeMap::from([(0, 2)]));
        assert_eq!(row.cells, vec!["A", "B", ""]);
    }

    #[test]
    fn no_schema_gives_empty_row() {
        let row = normalize_row(0, &[RawCell::new("a")], &[]);
        assert!(row.cells.is_empty() && row.links.is_empty() && row.numbers.is_empty());
    }
}
