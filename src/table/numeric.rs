//! Numeric classification of logical cell text.
//!
//! Filing tables write numbers with their display conventions baked into the
//! text (`$1,234.50`, `(12)`, `4.5%`). The classifier recovers the value and
//! remembers the conventions so the renderer can rebuild an equivalent number
//! format. Text that does not parse stays text; classification never fails.

use crate::helpers::string::strip_whitespace;
use crate::table::NumericCell;
use crate::table::NumericCellFormat;
use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)$").expect("Hardcode regex pattern")
});

/// Classifies one logical cell. Returns `None` for empty or non-numeric text.
pub fn classify(text: &str) -> Option<NumericCell> {
    if text.is_empty() {
        return None;
    }
    let mut format = NumericCellFormat {
        has_currency: text.contains('$'),
        has_percent: text.contains('%'),
        has_thousands_separator: text.contains(','),
        ..NumericCellFormat::default()
    };

    let mut literal = strip_whitespace(&text.replace(['$', '%', ','], ""));
    if let Some(inner) = literal.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        literal = format!("-{inner}");
        format.is_parenthesized_negative = true;
    }
    if !NUMERIC_LITERAL.is_match(&literal) {
        return None;
    }

    format.decimal_places = literal
        .split_once('.')
        .map(|(_, fraction)| fraction.len() as u32)
        .unwrap_or(0);
    let mut value = literal.parse::<f64>().ok().filter(|value| value.is_finite())?;
    if format.has_percent {
        value /= 100.0;
    }
    Some(NumericCell { value, format })
}
