//! Follow physics options

use firefly_core::{FireflyError, Result};
use serde::{Deserialize, Serialize};

/// Spring-damper options, in screen pixels and per-frame units.
/// Parsed from the `[follow]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// Pointer distance at which attraction fades to zero
    pub influence_radius: f32,
    pub spring_stiffness: f32,
    /// Velocity multiplier per tick
    pub damping: f32,
    /// Hard limit on distance from the rest position
    pub max_displacement: f32,
    pub return_force: f32,
    /// Depth offset (px) per unit of influence, times 20
    pub z_depth: f32,
    /// Radians of tilt per pixel/frame of horizontal velocity
    pub rotation_effect: f32,
    /// Inside this distance the spring stiffens by up to `stickiness`
    pub min_distance: f32,
    pub stickiness: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            influence_radius: 250.0,
            spring_stiffness: 0.12,
            damping: 0.92,
            max_displacement: 150.0,
            return_force: 0.08,
            z_depth: 0.8,
            rotation_effect: 0.0015,
            min_distance: 30.0,
            stickiness: 0.25,
        }
    }
}

impl FollowConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [
            ("follow.influence_radius", self.influence_radius),
            ("follow.max_displacement", self.max_displacement),
            ("follow.min_distance", self.min_distance),
        ] {
            if !(v > 0.0 && v.is_finite()) {
                return Err(FireflyError::invalid(field, "must be positive"));
            }
        }
        FireflyError::check_range("follow.damping", self.damping as f64, 0.0, 0.999)?;
        FireflyError::check_range("follow.spring_stiffness", self.spring_stiffness as f64, 0.0, 1.0)?;
        FireflyError::check_range("follow.return_force", self.return_force as f64, 0.0, 1.0)?;
        FireflyError::check_range("follow.stickiness", self.stickiness as f64, 0.0, 1.0)?;
        FireflyError::check_range("follow.z_depth", self.z_depth as f64, 0.0, 100.0)?;
        FireflyError::check_range("follow.rotation_effect", self.rotation_effect as f64, -1.0, 1.0)?;
        Ok(())
    }

    /// This config with every field the patch names replaced
    pub fn merged(&self, patch: &FollowConfigPatch) -> Self {
        Self {
            influence_radius: patch.influence_radius.unwrap_or(self.influence_radius),
            spring_stiffness: patch.spring_stiffness.unwrap_or(self.spring_stiffness),
            damping: patch.damping.unwrap_or(self.damping),
            max_displacement: patch.max_displacement.unwrap_or(self.max_displacement),
            return_force: patch.return_force.unwrap_or(self.return_force),
            z_depth: patch.z_depth.unwrap_or(self.z_depth),
            rotation_effect: patch.rotation_effect.unwrap_or(self.rotation_effect),
            min_distance: patch.min_distance.unwrap_or(self.min_distance),
            stickiness: patch.stickiness.unwrap_or(self.stickiness),
        }
    }
}

/// Partial `FollowConfig`. Used both as per-element overrides at
/// registration and as a runtime patch of the engine defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfigPatch {
    pub influence_radius: Option<f32>,
    pub spring_stiffness: Option<f32>,
    pub damping: Option<f32>,
    pub max_displacement: Option<f32>,
    pub return_force: Option<f32>,
    pub z_depth: Option<f32>,
    pub rotation_effect: Option<f32>,
    pub min_distance: Option<f32>,
    pub stickiness: Option<f32>,
}

impl FollowConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        FollowConfig::default().validate().unwrap();
    }

    #[test]
    fn test_merge_keeps_unnamed_fields() {
        let base = FollowConfig::default();
        let merged = base.merged(&FollowConfigPatch {
            damping: Some(0.5),
            ..Default::default()
        });
        assert_eq!(merged.damping, 0.5);
        assert_eq!(merged.max_displacement, 150.0);
        assert_eq!(base.merged(&FollowConfigPatch::default()), base);
    }

    #[test]
    fn test_rejects_undamped_spring() {
        let config = FollowConfig {
            damping: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FollowConfig {
            min_distance: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
