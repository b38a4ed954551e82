//! Tree generation parameters

use firefly_core::{FireflyError, Result, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Deepest recursion `validate` accepts
pub const MAX_DEPTH: u32 = 8;

/// Parameters for `Tree::generate`, parsed from the `[tree]` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub trunk_height: f32,
    pub trunk_radius: f32,
    /// Branch levels above the trunk
    pub depth: u32,
    /// Child radius = parent radius × this
    pub branching_factor: f32,
    /// Half-range of the per-axis direction jitter, in radians
    pub angle_variation: f32,
    /// Branches thinner than this are not generated
    pub min_radius: f32,
    pub max_children: u32,
    /// Root of the trunk in world space
    pub position: Vec3,
    pub sway_amount: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            trunk_height: 80.0,
            trunk_radius: 8.0,
            depth: 3,
            branching_factor: 0.7,
            angle_variation: PI / 6.0,
            min_radius: 1.0,
            max_children: 6,
            position: Vec3::new(0.0, -200.0, -50.0),
            sway_amount: 0.02,
        }
    }
}

impl TreeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.trunk_height > 0.0 && self.trunk_height.is_finite()) {
            return Err(FireflyError::invalid("tree.trunk_height", "must be positive"));
        }
        if !(self.trunk_radius > 0.0 && self.trunk_radius.is_finite()) {
            return Err(FireflyError::invalid("tree.trunk_radius", "must be positive"));
        }
        // min_radius > 0 is what stops a tiny branching factor from recursing forever
        if !(self.min_radius > 0.0 && self.min_radius.is_finite()) {
            return Err(FireflyError::invalid("tree.min_radius", "must be positive"));
        }
        FireflyError::check_range("tree.depth", self.depth as f64, 0.0, MAX_DEPTH as f64)?;
        if !(self.branching_factor > 0.0 && self.branching_factor < 1.0) {
            return Err(FireflyError::ValueOutOfRange {
                field: "tree.branching_factor".into(),
                min: 0.0,
                max: 1.0,
                value: self.branching_factor as f64,
            });
        }
        FireflyError::check_range("tree.max_children", self.max_children as f64, 2.0, 6.0)?;
        FireflyError::check_range("tree.angle_variation", self.angle_variation as f64, 0.0, PI as f64)?;
        FireflyError::check_range("tree.sway_amount", self.sway_amount as f64, 0.0, 1.0)?;
        Ok(())
    }
}
