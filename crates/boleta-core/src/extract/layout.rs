//! Spatial word-position analysis.
//!
//! Some layouts print a value in a separate text run from its label, so the
//! label and value never meet in the linear text. As a last resort the
//! extractor groups positioned words into lines and searches the label's
//! line (and the line below it) for the value.

use regex::Regex;

use super::amount::candidate_amounts;

/// Words closer than this vertically belong to the same line.
const LINE_TOLERANCE: f32 = 3.0;

/// A positioned token from the text acquisition collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedWord {
    /// Token text.
    pub text: String,
    /// Horizontal start coordinate.
    pub x0: f32,
    /// Horizontal end coordinate.
    pub x1: f32,
    /// Vertical position of the token's top edge.
    pub top: f32,
}

impl PositionedWord {
    pub fn new(text: impl Into<String>, x0: f32, x1: f32, top: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
        }
    }
}

/// A single visual line of words, ordered left to right.
#[derive(Debug, Clone)]
pub struct Line {
    pub top: f32,
    pub words: Vec<PositionedWord>,
}

impl Line {
    /// The line's words joined with single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Page words grouped into lines by approximate vertical position,
/// built once per page.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    lines: Vec<Line>,
}

impl LineIndex {
    /// Group words into lines: cluster by near-equal vertical position,
    /// then order each line left to right.
    pub fn build(words: &[PositionedWord]) -> Self {
        let mut sorted: Vec<PositionedWord> = words.to_vec();
        sorted.sort_by(|a, b| a.top.total_cmp(&b.top));

        let mut lines: Vec<Line> = Vec::new();
        for word in sorted {
            match lines.last_mut() {
                Some(line) if (word.top - line.top).abs() < LINE_TOLERANCE => {
                    line.words.push(word);
                }
                _ => lines.push(Line {
                    top: word.top,
                    words: vec![word],
                }),
            }
        }
        for line in &mut lines {
            line.words.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        }

        Self { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The token immediately to the right of a label token, with the
    /// horizontal gap bounded by `max_gap` and at least `min_digits`
    /// digits in the token.
    pub fn value_right_of(
        &self,
        label: &Regex,
        max_gap: f32,
        min_digits: usize,
    ) -> Option<String> {
        for line in &self.lines {
            for pair in line.words.windows(2) {
                let (left, right) = (&pair[0], &pair[1]);
                if !label.is_match(&left.text) {
                    continue;
                }
                let gap = right.x0 - left.x1;
                if gap >= 0.0 && gap <= max_gap && digit_count(&right.text) >= min_digits {
                    return Some(right.text.trim().to_string());
                }
            }
        }
        None
    }

    /// Candidate amounts on the line matching `label` and on the next line
    /// below it; some layouts print the amount beneath the label.
    pub fn amounts_near(&self, label: &Regex) -> Vec<i64> {
        let mut amounts = Vec::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if !label.is_match(&line.text()) {
                continue;
            }
            amounts.extend(candidate_amounts(&line.text()));
            if let Some(below) = self.lines.get(idx + 1) {
                amounts.extend(candidate_amounts(&below.text()));
            }
        }
        amounts
    }
}

/// A table extracted by the collaborator: rows of cell strings.
pub type Table = Vec<Vec<String>>;

/// The cell to the right of a label cell whose digit projection has at
/// least `min_digits` characters.
pub fn value_from_tables(tables: &[Table], label: &Regex, min_digits: usize) -> Option<String> {
    for table in tables {
        for row in table {
            for (idx, cell) in row.iter().enumerate() {
                if !label.is_match(cell) {
                    continue;
                }
                if let Some(next) = row.get(idx + 1) {
                    if digit_count(next) >= min_digits {
                        return Some(next.trim().to_string());
                    }
                }
            }
        }
    }
    None
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    fn sample_words() -> Vec<PositionedWord> {
        vec![
            PositionedWord::new("N°", 10.0, 22.0, 100.0),
            PositionedWord::new("1234567", 30.0, 80.0, 100.8),
            PositionedWord::new("TOTAL", 10.0, 45.0, 200.0),
            PositionedWord::new("A", 50.0, 55.0, 200.4),
            PositionedWord::new("PAGAR", 60.0, 95.0, 199.9),
            PositionedWord::new("$", 10.0, 14.0, 214.0),
            PositionedWord::new("45.000", 18.0, 60.0, 214.2),
        ]
    }

    #[test]
    fn test_build_groups_lines_and_orders() {
        let index = LineIndex::build(&sample_words());
        assert_eq!(index.lines().len(), 3);
        assert_eq!(index.lines()[0].text(), "N° 1234567");
        assert_eq!(index.lines()[1].text(), "TOTAL A PAGAR");
        assert_eq!(index.lines()[2].text(), "$ 45.000");
    }

    #[test]
    fn test_value_right_of_bounded_gap() {
        let index = LineIndex::build(&sample_words());
        let label = re(r"^N[º°]$");
        assert_eq!(
            index.value_right_of(&label, 20.0, 5),
            Some("1234567".to_string())
        );
        // Too small a gap bound rejects the same token.
        assert_eq!(index.value_right_of(&label, 4.0, 5), None);
        // Digit requirement filters short tokens.
        assert_eq!(index.value_right_of(&label, 20.0, 9), None);
    }

    #[test]
    fn test_amounts_near_scans_label_line_and_below() {
        let index = LineIndex::build(&sample_words());
        let label = re(r"(?i)TOTAL\s*A\s*PAGAR");
        assert_eq!(index.amounts_near(&label), vec![45_000]);
    }

    #[test]
    fn test_value_from_tables() {
        let tables = vec![vec![
            vec!["Documento".to_string(), "".to_string()],
            vec!["Folio".to_string(), "7654321".to_string()],
        ]];
        let label = re(r"(?i)Folio");
        assert_eq!(
            value_from_tables(&tables, &label, 5),
            Some("7654321".to_string())
        );
        assert_eq!(value_from_tables(&tables, &re(r"Cliente"), 5), None);
    }
}
