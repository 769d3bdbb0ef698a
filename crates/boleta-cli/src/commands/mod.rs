//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use boleta_core::models::BoletaConfig;

/// Load configuration from an explicit path, or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BoletaConfig> {
    match config_path {
        Some(path) => Ok(BoletaConfig::from_file(Path::new(path))?),
        None => Ok(BoletaConfig::default()),
    }
}
