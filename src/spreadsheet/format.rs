//! Number format codes rebuilt from a cell's source conventions.

use crate::table::NumericCellFormat;

/// First id available for custom number formats in `styles.xml`.
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Builds the format code for a numeric cell.
///
/// Currency wins over percent when the source text carried both markers.
pub fn number_format(format: &NumericCellFormat) -> String {
    let grouping = if format.has_thousands_separator { "#,##0" } else { "0" };
    let base = match format.decimal_places {
        0 => grouping.to_owned(),
        places => format!("{}.{}", grouping, "0".repeat(places as usize)),
    };
    let (prefix, suffix) = if format.has_currency {
        ("$", "")
    } else if format.has_percent {
        ("", "%")
    } else {
        ("", "")
    };
    if format.is_parenthesized_negative {
        format!("{prefix}{base}{suffix};({prefix}{base}{suffix})")
    } else {
        format!("{prefix}{base}{suffix}")
    }
}

/// Returns the built-in id for format codes every reader knows without a `numFmt` record.
pub fn builtin_number_format_id(code: &str) -> Option<u32> {
    match code {
        "General" => Some(0),
        "0" => Some(1),
        "0.00" => Some(2),
        "#,##0" => Some(3),
        "#,##0.00" => Some(4),
        "0%" => Some(9),
        "0.00%" => Some(10),
        _ => None,
    }
}
