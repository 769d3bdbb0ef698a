//! PDF text extraction using lopdf and pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::{Result, TextSource};
use crate::error::PdfError;

/// Text source backed by the document's embedded text layer.
///
/// This backend yields page text only; positioned words and tables are not
/// available from it, so the extractor's spatial fallbacks simply do not
/// engage for documents acquired this way.
pub struct PdfSource {
    pages: Vec<String>,
}

impl PdfSource {
    /// Open a PDF file and extract its text layer.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load a PDF from bytes and extract its text layer.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption.
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let text = pdf_extract::extract_text_from_mem(&raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        debug!(
            "loaded PDF with {} pages, {} chars of text",
            page_count,
            text.len()
        );

        Ok(Self {
            pages: split_pages(&text, page_count),
        })
    }
}

/// Apportion the full text across pages. The text layer comes back as one
/// stream, so pages are approximated as equal line ranges.
fn split_pages(text: &str, page_count: usize) -> Vec<String> {
    if page_count <= 1 {
        return vec![text.to_string()];
    }

    let lines: Vec<&str> = text.lines().collect();
    let lines_per_page = (lines.len() / page_count).max(1);

    (0..page_count)
        .map(|page| {
            let start = (page * lines_per_page).min(lines.len());
            let end = if page + 1 == page_count {
                lines.len()
            } else {
                ((page + 1) * lines_per_page).min(lines.len())
            };
            lines[start..end].join("\n")
        })
        .collect()
}

impl TextSource for PdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Option<String> {
        self.pages.get(page.saturating_sub(1) as usize).cloned()
    }
}
