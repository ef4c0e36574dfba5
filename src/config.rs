// ============================================================================
// config.rs — GridLife
// Session configuration: grid size, canvas size, dispatch shape and cadence.
// ============================================================================

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LifeError;
use crate::grid::GridDims;

/// Background the cell pass clears to (dark blue).
pub const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.4,
    a: 1.0,
};

/// Runtime configuration, loadable from JSON. Missing fields take defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Square canvas edge in physical pixels.
    pub canvas_size: u32,
    pub workgroup_size: u32,
    pub update_interval_ms: u64,
    /// Probability that a cell starts alive.
    pub seed_density: f32,
    pub seed: Option<u64>,
    pub hover_overlay: bool,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 32,
            canvas_size: 512,
            workgroup_size: 8,
            update_interval_ms: 200,
            seed_density: 0.4,
            seed: None,
            hover_overlay: true,
        }
    }
}

impl LifeConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LifeError> {
        let text = fs::read_to_string(path)?;
        let config: LifeConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LifeError> {
        self.grid()?;
        if self.workgroup_size == 0 {
            return Err(LifeError::InvalidConfig("workgroup_size must be > 0".into()));
        }
        if self.canvas_size == 0 {
            return Err(LifeError::InvalidConfig("canvas_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.seed_density) {
            return Err(LifeError::InvalidConfig(format!(
                "seed_density must be within [0, 1], got {}",
                self.seed_density
            )));
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<GridDims, LifeError> {
        GridDims::new(self.grid_width, self.grid_height)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }
}
