//! Tuning knobs for snapping and rulers.
//!
//! Every field has a default, so a config file only needs to mention the
//! values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Object snapping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Snap distance in screen pixels.
    pub margin_px: f64,
    /// Distance in scene units under which two points count as aligned
    /// when emitting guides.
    pub coincidence_epsilon: f64,
    /// Upper bound for the scene-unit tolerance. `None` leaves it unclamped.
    pub max_scene_tolerance: Option<f64>,
    /// Minimum time between two candidate gathering passes.
    pub throttle_ms: u64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            margin_px: 7.0,
            coincidence_epsilon: 1e-4,
            max_scene_tolerance: None,
            throttle_ms: 15,
        }
    }
}

impl SnapConfig {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

/// One row of the tick spacing table: at `min_zoom` and above, ticks may be
/// `gap` scene units apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapStep {
    pub min_zoom: f64,
    pub gap: f64,
}

impl GapStep {
    pub const fn new(min_zoom: f64, gap: f64) -> Self {
        Self { min_zoom, gap }
    }
}

/// Default tick spacing, finest zoom threshold last.
pub const DEFAULT_GAP_TABLE: [GapStep; 12] = [
    GapStep::new(0.02, 5000.0),
    GapStep::new(0.03, 2500.0),
    GapStep::new(0.05, 1000.0),
    GapStep::new(0.1, 500.0),
    GapStep::new(0.2, 250.0),
    GapStep::new(0.5, 100.0),
    GapStep::new(1.0, 50.0),
    GapStep::new(2.0, 25.0),
    GapStep::new(5.0, 10.0),
    GapStep::new(10.0, 5.0),
    GapStep::new(18.0, 2.0),
    GapStep::new(40.0, 1.0),
];

/// Ruler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulerConfig {
    pub enabled: bool,
    /// Thickness of each ruler strip in pixels.
    pub size_px: f64,
    pub font_size: f64,
    /// Width of the fade mask around each highlight band edge.
    pub mask_window_px: f64,
    pub gap_table: Vec<GapStep>,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size_px: 20.0,
            font_size: 10.0,
            mask_window_px: 160.0,
            gap_table: DEFAULT_GAP_TABLE.to_vec(),
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub snap: SnapConfig,
    pub ruler: RulerConfig,
}

impl Config {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let snap = &self.snap;
        if !snap.margin_px.is_finite() || snap.margin_px < 0.0 {
            return Err(invalid(format!("snap.margin_px must be >= 0, got {}", snap.margin_px)));
        }
        if !snap.coincidence_epsilon.is_finite() || snap.coincidence_epsilon < 0.0 {
            return Err(invalid(format!(
                "snap.coincidence_epsilon must be >= 0, got {}",
                snap.coincidence_epsilon
            )));
        }
        if let Some(max) = snap.max_scene_tolerance {
            if !(max.is_finite() && max > 0.0) {
                return Err(invalid(format!("snap.max_scene_tolerance must be > 0, got {max}")));
            }
        }

        let ruler = &self.ruler;
        if !(ruler.size_px.is_finite() && ruler.size_px > 0.0) {
            return Err(invalid(format!("ruler.size_px must be > 0, got {}", ruler.size_px)));
        }
        if !(ruler.font_size.is_finite() && ruler.font_size > 0.0) {
            return Err(invalid(format!("ruler.font_size must be > 0, got {}", ruler.font_size)));
        }
        if !ruler.mask_window_px.is_finite() || ruler.mask_window_px < 0.0 {
            return Err(invalid(format!(
                "ruler.mask_window_px must be >= 0, got {}",
                ruler.mask_window_px
            )));
        }
        if ruler.gap_table.is_empty() {
            return Err(invalid("ruler.gap_table must not be empty".to_string()));
        }
        for step in &ruler.gap_table {
            if !(step.min_zoom.is_finite() && step.min_zoom > 0.0 && step.gap.is_finite() && step.gap > 0.0) {
                return Err(invalid(format!("ruler.gap_table has an invalid row {step:?}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}
