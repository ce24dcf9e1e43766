use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineSettings;
use crate::extraction::sink::HeaderMode;

/// Environment variable naming a settings file to load at start-up.
pub const SETTINGS_ENV: &str = "RADIOMICS_SETTINGS";

// ---------------------------------------------------------------------------
// ExtractorSettings – user-tunable knobs, loaded from JSON
// ---------------------------------------------------------------------------

/// Settings shared by every batch of a session.
///
/// Every field is optional in the JSON file:
///
/// ```json
/// {
///   "engine": { "bin_width": 25.0, "geometry_tolerance": 1e-6 },
///   "header_mode": "first_row"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub engine: EngineSettings,
    pub header_mode: HeaderMode,
}

impl ExtractorSettings {
    /// Parse a JSON settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: ExtractorSettings =
            serde_json::from_str(&text).context("parsing settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from the file named by `RADIOMICS_SETTINGS`, or defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.engine.bin_width > 0.0,
            "bin_width must be positive, got {}",
            self.engine.bin_width
        );
        anyhow::ensure!(
            self.engine.geometry_tolerance >= 0.0,
            "geometry_tolerance must not be negative"
        );
        Ok(())
    }
}
