//! Ordered pattern cascades and label-relative text windows.
//!
//! Bill layouts vary between label-before-value and value-before-label, and
//! between spaced and unspaced text, so every field lookup degrades through
//! an ordered list of increasingly permissive strategies instead of one
//! fixed pattern.

use regex::Regex;

/// Try each pattern in order; return the first capture group of the first
/// pattern that matches.
pub fn first_match(patterns: &[Regex], text: &str) -> Option<String> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Some(group) = caps.get(1) {
                return Some(group.as_str().trim().to_string());
            }
        }
    }
    None
}

/// The `width` characters immediately following the first occurrence of
/// `label`, or `None` if the label is absent. Clipped to the text bounds.
pub fn window_after<'t>(label: &Regex, text: &'t str, width: usize) -> Option<&'t str> {
    let m = label.find(text)?;
    let end = advance_chars(text, m.end(), width);
    Some(&text[m.end()..end])
}

/// A window spanning `left` characters before the first occurrence of
/// `label` through `right` characters after its end. Used when a value
/// precedes its label on the page.
pub fn window_around<'t>(
    label: &Regex,
    text: &'t str,
    left: usize,
    right: usize,
) -> Option<&'t str> {
    let m = label.find(text)?;
    let start = retreat_chars(text, m.start(), left);
    let end = advance_chars(text, m.end(), right);
    Some(&text[start..end])
}

/// Byte index `n` characters forward of `from`, clipped to the text length.
fn advance_chars(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map(|(offset, _)| from + offset)
        .unwrap_or(text.len())
}

/// Byte index `n` characters back from `from`, clipped to zero.
fn retreat_chars(text: &str, from: usize, n: usize) -> usize {
    let mut idx = from;
    for _ in 0..n {
        match text[..idx].chars().next_back() {
            Some(c) => idx -= c.len_utf8(),
            None => break,
        }
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_first_match_respects_order() {
        let patterns = vec![re(r"Folio[:\s]*(\d+)"), re(r"N°\s*(\d+)")];
        let text = "N° 111 Folio: 222";
        assert_eq!(first_match(&patterns, text), Some("222".to_string()));
    }

    #[test]
    fn test_first_match_absent() {
        let patterns = vec![re(r"Folio[:\s]*(\d+)")];
        assert_eq!(first_match(&patterns, "sin folio"), None);
    }

    #[test]
    fn test_window_after_width_and_clip() {
        let label = re(r"TOTAL A PAGAR");
        let text = "xx TOTAL A PAGAR $ 45.000";
        assert_eq!(window_after(&label, text, 5), Some(" $ 45"));
        assert_eq!(window_after(&label, text, 500), Some(" $ 45.000"));
        assert_eq!(window_after(&label, "otra cosa", 5), None);
    }

    #[test]
    fn test_window_around_includes_left_context() {
        let label = re(r"TOTAL");
        let text = "45.000 $ TOTAL mensual";
        assert_eq!(window_around(&label, text, 9, 4), Some("45.000 $ TOTAL men"));
    }

    #[test]
    fn test_windows_are_utf8_safe() {
        let label = re(r"EMISIÓN");
        let text = "ñandú EMISIÓN más ñ";
        // Window edges land between characters, never inside one.
        assert_eq!(window_after(&label, text, 3), Some(" má"));
        assert_eq!(window_around(&label, text, 4, 2), Some("ndú EMISIÓN m"));
    }
}
