//! A1-style cell references.

use regex::Regex;
use std::sync::LazyLock;

static CELL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]{1,7})$").expect("Hardcode regex pattern")
});

/// Converts a 0-based column index to its letters ("A", "Z", "AA", ...).
pub fn column_name(mut col: usize) -> String {
    let mut name = Vec::<u8>::with_capacity(3);
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Converts 0-based (row, col) to a reference such as "B3".
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", column_name(col), row + 1)
}

/// Parses a reference such as "B3" or "$B$3" into 0-based (row, col).
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = CELL_REFERENCE.captures(reference)?;
    let col = captures[1]
        .bytes()
        .fold(0usize, |acc, letter| acc * 26 + (letter.to_ascii_uppercase() - b'A' + 1) as usize);
    let row = captures[2].parse::<usize>().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
