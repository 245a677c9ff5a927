//! Lookups over raw inline CSS (`style="..."`) as emitted by filing renderers.

use regex::Regex;
use std::sync::LazyLock;

/// Four-value `padding` shorthand; the fourth value is the left padding.
static PADDING_SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[;\s])padding\s*:\s*[\d.]+[a-z%]*\s+[\d.]+[a-z%]*\s+[\d.]+[a-z%]*\s+(\d+(?:\.\d+)?)pt")
        .expect("Hardcode regex pattern")
});

static PADDING_LEFT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[;\s])padding-left\s*:\s*(\d+(?:\.\d+)?)pt").expect("Hardcode regex pattern")
});

static BACKGROUND_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[;\s])background-color\s*:\s*([^;]*)").expect("Hardcode regex pattern")
});

/// Spellings of white that do not count as shading.
const WHITE_VALUES: [&str; 5] = ["#ffffff", "#fff", "white", "rgb(255,255,255)", "rgba(255,255,255,1)"];

/// Extracts the left padding in points from a style string.
///
/// The four-value `padding` shorthand wins over `padding-left`; anything else is 0.
pub(crate) fn left_padding(style: &str) -> u32 {
    PADDING_SHORTHAND
        .captures(style)
        .or_else(|| PADDING_LEFT.captures(style))
        .and_then(|captures| captures.get(1))
        .and_then(|matcher| matcher.as_str().parse::<f64>().ok())
        .map(|points| points.round() as u32)
        .unwrap_or(0)
}

/// Returns the declared `background-color` value, lowercased and without spaces.
pub(crate) fn background_color(style: &str) -> Option<String> {
    let value = BACKGROUND_COLOR.captures(style)?.get(1)?.as_str();
    let value = value
        .to_ascii_lowercase()
        .replace("!important", "")
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect::<String>();
    Some(value).filter(|value| !value.is_empty())
}

/// True when the style declares a background color that is not white.
pub(crate) fn is_shaded(style: &str) -> bool {
    background_color(style)
        .map(|color| !WHITE_VALUES.contains(&color.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_shorthand_takes_fourth_value() {
        assert_eq!(left_padding("padding: 0pt 2pt 0pt 19pt; text-align: left"), 19);
        assert_eq!(left_padding("padding:2px 1pt 2px 28pt"), 28);
    }

    #[test]
    fn padding_left_fallback() {
        assert_eq!(left_padding("vertical-align:bottom;padding-left:15pt"), 15);
        assert_eq!(left_padding("padding-left: 9.6pt"), 10);
    }

    #[test]
    fn padding_absent_is_zero() {
        assert_eq!(left_padding(""), 0);
        assert_eq!(left_padding("padding: 2pt"), 0);
        assert_eq!(left_padding("padding-left: 1em"), 0);
        assert_eq!(left_padding("cellpadding-left: 12pt"), 0);
    }

    #[test]
    fn background_detection() {
        assert!(is_shaded("background-color: #cceeff; padding: 0"));
        assert!(is_shaded("BACKGROUND-COLOR:rgb(204, 238, 255)"));
        assert!(!is_shaded("background-color: #FFFFFF"));
        assert!(!is_shaded("background-color: white !important"));
        assert!(!is_shaded("background-color: rgb(255, 255, 255)"));
        assert!(!is_shaded("background-color: rgba(255,255,255,1)"));
        assert!(!is_shaded("color: #cceeff"));
        assert!(!is_shaded("background-color: ;"));
    }
}
