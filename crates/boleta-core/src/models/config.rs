//! Configuration for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify::Provider;

/// Main configuration for the boleta pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BoletaConfig {
    /// Output artifact configuration.
    pub output: OutputConfig,

    /// Extraction tuning.
    pub extraction: ExtractionConfig,
}

/// Output artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for result artifacts; defaults to the input directory.
    pub output_dir: Option<PathBuf>,

    /// File stem for the timestamped artifacts.
    pub file_stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_stem: "boletas_extraidas".to_string(),
        }
    }
}

/// Extraction tuning.
///
/// The implausible-total floors differ between provider lineages with no
/// authoritative rule, so they stay configurable per provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Metrogas totals below this trigger the candidate-scan rescue.
    pub metrogas_total_floor: i64,

    /// Enel floor.
    pub enel_total_floor: i64,

    /// Aguas Andinas floor.
    pub aguas_andinas_total_floor: i64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            metrogas_total_floor: 1_000,
            enel_total_floor: 1_000,
            aguas_andinas_total_floor: 10_000,
        }
    }
}

impl ExtractionConfig {
    /// The configured floor for a provider, if it has one.
    pub fn total_floor(&self, provider: Provider) -> Option<i64> {
        match provider {
            Provider::Metrogas => Some(self.metrogas_total_floor),
            Provider::Enel => Some(self.enel_total_floor),
            Provider::AguasAndinas => Some(self.aguas_andinas_total_floor),
            Provider::Unknown => None,
        }
    }
}

impl BoletaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_floors() {
        let config = BoletaConfig::default();
        assert_eq!(config.extraction.total_floor(Provider::Metrogas), Some(1_000));
        assert_eq!(
            config.extraction.total_floor(Provider::AguasAndinas),
            Some(10_000)
        );
        assert_eq!(config.extraction.total_floor(Provider::Unknown), None);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = BoletaConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: BoletaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.extraction.enel_total_floor,
            config.extraction.enel_total_floor
        );
        assert_eq!(parsed.output.file_stem, "boletas_extraidas");
    }
}
