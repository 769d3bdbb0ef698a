//! Core library for Chilean utility-bill field extraction.
//!
//! This crate provides:
//! - PDF text acquisition (embedded text layer via lopdf/pdf-extract)
//! - Text normalization into linear and compact views
//! - A per-provider cascade of pattern-matching rules with windowed,
//!   compact-text and spatial fallbacks
//! - Monetary amount parsing and plausibility-ranked disambiguation
//! - Per-record validation and status classification

pub mod classify;
pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod text;

pub use classify::{classify, Provider};
pub use error::{BoletaError, ExtractionError, PdfError, Result};
pub use extract::{BillExtractor, ProviderRules};
pub use models::{BoletaConfig, FieldRecord, RecordBuilder, RecordStatus};
pub use pdf::{PdfSource, TextSource};
pub use text::{normalize, NormalizedText};
