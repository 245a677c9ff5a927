//! Vertical-span resolution for the two-line label header.
//!
//! Filing renderers put the column labels in physical rows 1 and 2, with some
//! labels in row 1 spanning down into row 2. Row 2 is rebuilt with those
//! labels spliced in at their atomic column position so it can define the
//! column boundaries on its own. Spans anywhere else are left alone.

use crate::html::PhysicalRow;
use crate::html::RawCell;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

/// Index of the row whose downward spans are resolved.
pub const SPANNING_ROW: usize = 1;

/// Index of the row that receives the spanning cells.
pub const RECEIVING_ROW: usize = 2;

/// Span accounting went inconsistent. Recovered by treating the cell as non-spanning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed span in row {row}: {reason} at atomic column {position} (reached {reached})")]
pub struct MalformedSpanError {
    /// Physical row being rebuilt or expanded
    pub row: usize,
    /// Atomic column the span was expected to start or end at
    pub position: usize,
    /// Atomic column the running counter actually reached
    pub reached: usize,
    pub reason: &'static str,
}

/// Returns the corrected receiving row, or `None` if nothing spans into it.
pub fn resolve_vertical_spans(rows: &[PhysicalRow]) -> Option<PhysicalRow> {
    if rows.len() <= RECEIVING_ROW {
        return None;
    }

    let mut insertions = Vec::<(usize, &RawCell)>::new();
    let mut position = 0usize;
    for cell in &rows[SPANNING_ROW] {
        if cell.rowspan > 1 {
            insertions.push((position, cell));
        }
        position += cell.colspan;
    }
    if insertions.is_empty() {
        return None;
    }

    let receiving = &rows[RECEIVING_ROW];
    let mut corrected = PhysicalRow::with_capacity(receiving.len() + insertions.len());
    let mut consumed = 0usize;
    let mut reached = 0usize;
    let mut inserted = 0usize;
    for (position, cell) in insertions {
        while reached < position && consumed < receiving.len() {
            reached += receiving[consumed].colspan;
            corrected.push(receiving[consumed].clone());
            consumed += 1;
        }
        if reached > position {
            let error = MalformedSpanError {
                row: RECEIVING_ROW,
                position,
                reached,
                reason: "cell straddles a rowspan insertion point",
            };
            warn!("{}; '{}' treated as non-spanning", error, cell.text);
            continue;
        }
        corrected.push(cell.clone());
        reached += cell.colspan;
        inserted += 1;
    }
    corrected.extend(receiving[consumed..].iter().cloned());

    debug!("Spliced {} spanning cells into row {}", inserted, RECEIVING_ROW);
    Some(corrected).filter(|_| inserted > 0)
}
