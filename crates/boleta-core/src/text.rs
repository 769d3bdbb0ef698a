//! Text normalization: linear and compact views of the extracted text.

use unicode_normalization::UnicodeNormalization;

/// The two normalized views of a document's text.
///
/// `linear` keeps single spaces between tokens; `compact` removes all
/// whitespace so labels and values that a PDF layout rendered without
/// separating spaces can still be matched.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub linear: String,
    pub compact: String,
}

/// Normalize page texts into a [`NormalizedText`] pair.
///
/// Pages are concatenated in order, NFKC-folded, NBSP and the cubic-meter
/// glyph are substituted, and whitespace runs collapse to single spaces.
/// Never fails; empty input yields an empty pair.
pub fn normalize(pages: &[String]) -> NormalizedText {
    let mut joined = String::new();
    for page in pages {
        if !joined.is_empty() && !page.is_empty() {
            joined.push(' ');
        }
        joined.push_str(page);
    }

    let folded: String = joined.nfkc().collect();
    let substituted = folded.replace('\u{00a0}', " ").replace("m³", "m3");

    let linear = substituted.split_whitespace().collect::<Vec<_>>().join(" ");
    let compact: String = linear.chars().filter(|c| !c.is_whitespace()).collect();

    NormalizedText { linear, compact }
}
