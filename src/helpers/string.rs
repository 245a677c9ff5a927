//! Text normalization utilities shared by the extractor and the renderer.

/// Collapses every whitespace run (including non-breaking spaces) into a single
/// ASCII space and trims both ends.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending_space = false;
    for character in text.chars() {
        if character.is_whitespace() {
            pending_space = !normalized.is_empty();
        } else {
            if pending_space {
                normalized.push(' ');
                pending_space = false;
            }
            normalized.push(character);
        }
    }
    normalized
}

/// Removes every whitespace character, not just the leading and trailing ones.
pub(crate) fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|character| !character.is_whitespace()).collect()
}

/// Number of characters a viewer shows for this text.
#[inline]
pub(crate) fn display_width(text: &str) -> usize {
    text.chars().count()
}
