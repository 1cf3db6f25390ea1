//! Procedural terrain profile
//!
//! The ground is a sum of two sinusoids. Height is a pure function of x, so
//! any stretch of ground can be dropped and regenerated bit-for-bit.

use serde::{Deserialize, Serialize};

/// Parameters of the ground curve `base_y + amp1*sin(x*freq1) + amp2*sin(x*freq2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainProfile {
    /// Mean ground height (world is y-down)
    pub base_y: f32,
    /// Long rolling hills
    pub amp1: f32,
    pub freq1: f32,
    /// Shorter bumps on top of the hills
    pub amp2: f32,
    pub freq2: f32,
}

impl Default for TerrainProfile {
    fn default() -> Self {
        Self {
            base_y: 450.0,
            amp1: 160.0,
            freq1: 0.0016,
            amp2: 70.0,
            freq2: 0.004,
        }
    }
}

impl TerrainProfile {
    /// Ground height at `x`
    #[inline]
    pub fn height(&self, x: f32) -> f32 {
        self.base_y + self.amp1 * (x * self.freq1).sin() + self.amp2 * (x * self.freq2).sin()
    }
}
