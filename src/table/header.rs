//! Header and column-boundary detection.
//!
//! The header row is chosen by an ordered list of rules; the first rule that
//! matches wins, and [`FALLBACK`] applies when none does. Each rule is a plain
//! function over the physical rows so it can be tested on its own.

use crate::helpers::style::is_shaded;
use crate::html::PhysicalRow;
use crate::html::RawCell;
use crate::table::ColumnBoundary;

/// Rows between a shaded data row and the header row that defines the columns.
const SHADED_ROW_LEAD: usize = 2;

/// Rows between the header row and the first shaded row of the output.
const SHADING_LEAD: usize = 2;

/// Which rule picked the header row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DetectionRule {
    /// A non-white background was found on this physical row
    ShadedRow { shaded_row: usize },
    /// This physical row was the first with a non-empty first cell
    FirstLabelledRow,
    /// Neither rule matched
    Fallback,
}

/// Where the column schema comes from and where row processing begins.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Physical row whose cells define the column boundaries
    pub header_row: usize,
    /// First physical row turned into a logical row
    pub start_row: usize,
    pub rule: DetectionRule,
}

impl HeaderLayout {
    /// Index into the logical rows where alternating shading starts: two
    /// physical rows below the header, clamped into the produced rows.
    pub fn header_row_offset(&self, row_count: usize) -> usize {
        let anchor = (self.header_row + SHADING_LEAD).saturating_sub(self.start_row);
        anchor.min(row_count.saturating_sub(1))
    }
}

/// A detection rule; `None` passes to the next one.
pub type Rule = fn(&[PhysicalRow]) -> Option<HeaderLayout>;

/// Rules in evaluation order.
pub const RULES: [Rule; 2] = [shaded_row_rule, first_labelled_row_rule];

/// Layout used when no rule matches.
pub const FALLBACK: HeaderLayout = HeaderLayout {
    header_row: 1,
    start_row: 1,
    rule: DetectionRule::Fallback,
};

/// Runs the rules in order and clamps the result to the rows that exist.
pub fn detect_layout(rows: &[PhysicalRow]) -> HeaderLayout {
    let layout = RULES.iter().find_map(|rule| rule(rows)).unwrap_or(FALLBACK);
    let last_row = rows.len().saturating_sub(1);
    HeaderLayout {
        header_row: layout.header_row.min(last_row),
        start_row: layout.start_row.min(last_row),
        rule: layout.rule,
    }
}

/// The first row carrying a non-white background marks the data area; the
/// header sits two rows above it and processing starts one row above that.
pub fn shaded_row_rule(rows: &[PhysicalRow]) -> Option<HeaderLayout> {
    let shaded_row = rows
        .iter()
        .position(|row| row.iter().any(|cell| is_shaded(&cell.style)))?;
    let header_row = shaded_row.saturating_sub(SHADED_ROW_LEAD);
    Some(HeaderLayout {
        header_row,
        start_row: header_row.saturating_sub(1).max(1),
        rule: DetectionRule::ShadedRow { shaded_row },
    })
}

/// The first row whose first cell has text is the header, and processing starts there.
pub fn first_labelled_row_rule(rows: &[PhysicalRow]) -> Option<HeaderLayout> {
    let header_row = rows
        .iter()
        .position(|row| row.first().map(|cell| !cell.text.is_empty()).unwrap_or(false))?;
    Some(HeaderLayout {
        header_row,
        start_row: header_row,
        rule: DetectionRule::FirstLabelledRow,
    })
}

/// Partitions the atomic columns by the header cells' colspans.
pub fn column_boundaries(header_cells: &[RawCell]) -> Vec<ColumnBoundary> {
    let mut start = 0usize;
    header_cells
        .iter()
        .map(|cell| {
            let end = start + cell.colspan.max(1);
            let boundary = ColumnBoundary::new(start, end);
            start = end;
            boundary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(count: usize) -> Vec<PhysicalRow> {
        (0..count).map(|_| vec![RawCell::new("")]).collect()
    }

    fn shade(rows: &mut [PhysicalRow], index: usize) {
        rows[index].push(RawCell::new("x").with_style("background-color:#cceeff"));
    }

    #[test]
    fn shaded_row_four() {
        let mut rows = plain(8);
        shade(&mut rows, 4);
        shade(&mut rows, 6);
        let layout = detect_layout(&rows);
        assert_eq!(layout.header_row, 2);
        assert_eq!(layout.start_row, 1);
        assert_eq!(layout.rule, DetectionRule::ShadedRow { shaded_row: 4 });
    }

    #[test]
    fn shaded_row_three() {
        let mut rows = plain(6);
        shade(&mut rows, 3);
        let layout = detect_layout(&rows);
        assert_eq!((layout.header_row, layout.start_row), (1, 1));
    }

    #[test]
    fn shaded_row_near_top() {
        let mut rows = plain(4);
        shade(&mut rows, 1);
        assert_eq!(shaded_row_rule(&rows).map(|l| (l.header_row, l.start_row)), Some((0, 1)));
    }

    #[test]
    fn white_background_is_not_shading() {
        let mut rows = plain(5);
        rows[2].push(RawCell::new("x").with_style("background-color: #FFF"));
        assert_eq!(shaded_row_rule(&rows), None);
    }

    #[test]
    fn first_labelled_row() {
        let mut rows = plain(6);
        rows[3][0].text = "Revenue".to_owned();
        rows[4][0].text = "Cost".to_owned();
        let layout = detect_layout(&rows);
        assert_eq!(layout.header_row, 3);
        assert_eq!(layout.start_row, 3);
        assert_eq!(layout.rule, DetectionRule::FirstLabelledRow);
    }

    #[test]
    fn fallback_and_clamping() {
        let rows = plain(5);
        assert_eq!(detect_layout(&rows), FALLBACK);

        let rows = plain(1);
        let layout = detect_layout(&rows);
        assert_eq!((layout.header_row, layout.start_row), (0, 0));

        let layout = detect_layout(&[]);
        assert_eq!((layout.header_row, layout.start_row), (0, 0));
    }

    #[test]
    fn shading_offset() {
        let layout = HeaderLayout { header_row: 2, start_row: 1, rule: DetectionRule::Fallback };
        assert_eq!(layout.header_row_offset(10), 3);
        assert_eq!(layout.header_row_offset(2), 1);
        assert_eq!(layout.header_row_offset(0), 0);
        let layout = HeaderLayout { header_row: 3, start_row: 3, rule: DetectionRule::FirstLabelledRow };
        assert_eq!(layout.header_row_offset(10), 2);
    }

    #[test]
    fn boundaries_partition_atomic_columns() {
        let cells = vec![
            RawCell::new("a"),
            RawCell::new("b").with_colspan(3),
            RawCell::new("c").with_colspan(2),
        ];
        let boundaries = column_boundaries(&cells);
        assert_eq!(
            boundaries,
            vec![ColumnBoundary::new(0, 1), ColumnBoundary::new(1, 4), ColumnBoundary::new(4, 6)]
        );
        for pair in boundaries.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(column_boundaries(&[]).is_empty());
    }
}
