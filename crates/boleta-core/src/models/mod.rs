//! Data models: extraction records and pipeline configuration.

pub mod config;
pub mod record;

pub use config::{BoletaConfig, ExtractionConfig, OutputConfig};
pub use record::{FieldRecord, RecordBuilder, RecordStatus, COLUMNS};
