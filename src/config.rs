//! Site configuration

use serde::Deserialize;

use crate::constants::DEFAULT_VOLUME;
use crate::theme::ThemeMode;

/// Start-up options for the page effects.
///
/// The page may embed a JSON object (camelCase keys) to override any field;
/// everything missing keeps its default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Run the 2D rising-motes layer (recycle policy).
    pub flat_particles: bool,
    /// Run the WebGL blossom layer (wraparound policy).
    pub volume_particles: bool,
    pub default_theme: ThemeMode,
    pub default_volume: f64,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            flat_particles: true,
            volume_particles: true,
            default_theme: ThemeMode::Dark,
            default_volume: DEFAULT_VOLUME,
            seed: None,
        }
    }
}

impl SiteConfig {
    /// Parse an embedded config block, falling back to defaults on bad input.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed site config: {err}");
                Self::default()
            }
        }
    }
}
