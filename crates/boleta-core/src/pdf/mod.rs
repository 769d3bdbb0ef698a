//! Text acquisition from PDF documents.

mod source;

pub use source::PdfSource;

use crate::error::PdfError;
use crate::extract::layout::{PositionedWord, Table};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A document that can yield page-ordered text and, optionally, positioned
/// word tokens and tables.
///
/// Page-level failures must not propagate: a page that cannot be decoded
/// yields `None`, which the extractor treats as empty text. Only opening
/// the document can fail outright.
pub trait TextSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Plain text of a page (1-indexed), or `None` if the page could not
    /// be decoded.
    fn page_text(&self, page: u32) -> Option<String>;

    /// Positioned word tokens of a page, when the backend provides them.
    fn page_words(&self, _page: u32) -> Option<Vec<PositionedWord>> {
        None
    }

    /// Tables of a page as rows of cell strings, when the backend
    /// provides them.
    fn page_tables(&self, _page: u32) -> Option<Vec<Table>> {
        None
    }
}
