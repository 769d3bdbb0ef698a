//! Error types for the boleta-core library.

use thiserror::Error;

/// Main error type for the boleta library.
#[derive(Error, Debug)]
pub enum BoletaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text acquisition.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract the document text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to read the file from disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to bill field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Document text could not be acquired at all.
    #[error("failed to acquire document text: {0}")]
    Acquisition(#[from] PdfError),

    /// No rules exist for the requested provider.
    #[error("no extraction rules for provider: {0}")]
    UnknownProvider(String),
}

/// Result type for the boleta library.
pub type Result<T> = std::result::Result<T, BoletaError>;
