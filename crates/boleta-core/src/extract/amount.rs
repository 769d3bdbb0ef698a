//! Monetary amount parsing and disambiguation.
//!
//! Chilean bills format amounts with "." as thousands separator and "," as
//! decimal separator, and the "total to pay" label is frequently adjacent
//! to several numbers (subtotals, taxes, page totals). A single capture is
//! unreliable, so the engine can also collect every monetary-shaped number
//! in a bounded neighborhood and rank them for plausibility.

use lazy_static::lazy_static;
use regex::Regex;

/// Minimum plausible bill total in CLP; smaller candidates are usually
/// incidental numbers such as page counts or line items.
pub const PLAUSIBLE_TOTAL_FLOOR: i64 = 10_000;

lazy_static! {
    /// A currency-shaped numeral: groups of 1-3 digits separated by "." or
    /// space with trailing 3-digit groups, or a plain digit run, optionally
    /// preceded by "$" and followed by a 1-2 digit decimal-comma remainder.
    static ref CANDIDATE_AMOUNT: Regex = Regex::new(
        r"\$?\s*(\d{1,3}(?:[.\s]\d{3})+|\d+)(?:,(\d{1,2}))?\b"
    ).unwrap();
}

/// Result of cleaning a raw amount string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanAmount {
    /// Parsed and truncated to whole currency units.
    Parsed(i64),
    /// Could not be parsed; the cleaned string is kept as a best effort.
    Unparsed(String),
}

impl CleanAmount {
    /// The parsed value, if any.
    pub fn value(&self) -> Option<i64> {
        match self {
            CleanAmount::Parsed(v) => Some(*v),
            CleanAmount::Unparsed(_) => None,
        }
    }
}

/// Clean a locale-formatted amount ("1.234.567" or "6.840,5") into whole
/// currency units. Thousands dots are stripped and the decimal comma
/// becomes a point before parsing and truncating. Unparseable input comes
/// back as [`CleanAmount::Unparsed`]; empty input is `None`. Never fails.
pub fn clean_amount(raw: &str) -> Option<CleanAmount> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace('.', "")
        .replace(',', ".");

    if cleaned.is_empty() {
        return None;
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() < i64::MAX as f64 => {
            Some(CleanAmount::Parsed(v.trunc() as i64))
        }
        _ => Some(CleanAmount::Unparsed(cleaned)),
    }
}

/// All monetary-shaped numbers in `text`, cleaned to integers. Tokens that
/// do not survive cleaning are silently skipped.
pub fn candidate_amounts(text: &str) -> Vec<i64> {
    CANDIDATE_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| {
            let integer = caps.get(1)?.as_str();
            let token = match caps.get(2) {
                Some(decimal) => format!("{},{}", integer, decimal.as_str()),
                None => integer.to_string(),
            };
            clean_amount(&token)?.value()
        })
        .collect()
}

/// Pick the most plausible total from a candidate list: the largest
/// candidate at or above [`PLAUSIBLE_TOTAL_FLOOR`], else the largest of
/// all. `None` only for an empty list.
pub fn pick_preferred_total(candidates: &[i64]) -> Option<i64> {
    let plausible = candidates
        .iter()
        .filter(|&&c| c >= PLAUSIBLE_TOTAL_FLOOR)
        .max();
    plausible.or_else(|| candidates.iter().max()).copied()
}
