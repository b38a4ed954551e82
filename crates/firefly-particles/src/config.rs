//! Engine configuration and runtime patches

use firefly_core::{FireflyError, Result, Vec3};
use serde::{Deserialize, Serialize};

/// Parameters for `ParticleEngine`, parsed from the `[particles]` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub firefly_count: usize,
    /// Multiplies every particle's rendered size
    pub firefly_scale: f32,
    /// World units within which the pointer pushes and swirls particles
    pub mouse_radius: f32,
    pub mouse_force: f32,
    pub ui_avoidance_enabled: bool,
    pub ui_avoidance_strength: f32,
    /// Full size of the box uniform spawns are drawn from, centered on the origin
    pub spawn_extent: Vec3,
    /// Share of particles seeded at tree anchors when any are available
    pub tree_spawn_ratio: f32,
    /// Per-axis jitter around a tree anchor
    pub tree_spawn_jitter: f32,
    /// Relative aspect change on resize that triggers a respawn
    pub respawn_aspect_threshold: f32,
    /// Halo falloff exponent fed to the firefly shader
    pub glow_strength: f32,
    /// Radius of the solid core, as a share of the rendered size
    pub core_size: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            firefly_count: 200,
            firefly_scale: 1.0,
            mouse_radius: 200.0,
            mouse_force: 0.5,
            ui_avoidance_enabled: true,
            ui_avoidance_strength: 0.8,
            spawn_extent: Vec3::new(800.0, 600.0, 400.0),
            tree_spawn_ratio: 0.3,
            tree_spawn_jitter: 20.0,
            respawn_aspect_threshold: 0.2,
            glow_strength: 5.0,
            core_size: 0.3,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        FireflyError::check_range("particles.firefly_count", self.firefly_count as f64, 0.0, 100_000.0)?;
        FireflyError::check_range("particles.firefly_scale", self.firefly_scale as f64, 0.0, 100.0)?;
        if !(self.mouse_radius > 0.0 && self.mouse_radius.is_finite()) {
            return Err(FireflyError::invalid("particles.mouse_radius", "must be positive"));
        }
        FireflyError::check_range("particles.mouse_force", self.mouse_force as f64, 0.0, 100.0)?;
        FireflyError::check_range(
            "particles.ui_avoidance_strength",
            self.ui_avoidance_strength as f64,
            0.0,
            100.0,
        )?;
        for (axis, v) in [("x", self.spawn_extent.x), ("y", self.spawn_extent.y), ("z", self.spawn_extent.z)] {
            if !(v >= 0.0 && v.is_finite()) {
                return Err(FireflyError::invalid(
                    format!("particles.spawn_extent.{axis}"),
                    "must be a non-negative number",
                ));
            }
        }
        FireflyError::check_range("particles.tree_spawn_ratio", self.tree_spawn_ratio as f64, 0.0, 1.0)?;
        FireflyError::check_range("particles.tree_spawn_jitter", self.tree_spawn_jitter as f64, 0.0, 1000.0)?;
        FireflyError::check_range(
            "particles.respawn_aspect_threshold",
            self.respawn_aspect_threshold as f64,
            0.0,
            10.0,
        )?;
        FireflyError::check_range("particles.glow_strength", self.glow_strength as f64, 0.0, 100.0)?;
        FireflyError::check_range("particles.core_size", self.core_size as f64, 0.0, 1.0)?;
        Ok(())
    }

    /// Apply a patch. Returns whether the population must be rebuilt.
    /// An invalid result is rejected and the config left untouched.
    pub fn apply(&mut self, patch: &EngineConfigPatch) -> Result<bool> {
        let mut next = self.clone();
        let mut respawn = false;

        if let Some(v) = patch.firefly_count {
            respawn |= v != next.firefly_count;
            next.firefly_count = v;
        }
        if let Some(v) = patch.firefly_scale {
            respawn |= v != next.firefly_scale;
            next.firefly_scale = v;
        }
        if let Some(v) = patch.ui_avoidance_enabled {
            respawn |= v != next.ui_avoidance_enabled;
            next.ui_avoidance_enabled = v;
        }
        if let Some(v) = patch.ui_avoidance_strength {
            respawn |= v != next.ui_avoidance_strength;
            next.ui_avoidance_strength = v;
        }
        if let Some(v) = patch.mouse_radius {
            next.mouse_radius = v;
        }
        if let Some(v) = patch.mouse_force {
            next.mouse_force = v;
        }
        if let Some(v) = patch.tree_spawn_ratio {
            next.tree_spawn_ratio = v;
        }
        if let Some(v) = patch.respawn_aspect_threshold {
            next.respawn_aspect_threshold = v;
        }

        if let Err(e) = next.validate() {
            log::warn!("Rejected particle config patch: {e}");
            return Err(e);
        }
        *self = next;
        Ok(respawn)
    }
}

/// Partial update for `EngineConfig`; `None` fields are left unchanged
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfigPatch {
    pub firefly_count: Option<usize>,
    pub firefly_scale: Option<f32>,
    pub mouse_radius: Option<f32>,
    pub mouse_force: Option<f32>,
    pub ui_avoidance_enabled: Option<bool>,
    pub ui_avoidance_strength: Option<f32>,
    pub tree_spawn_ratio: Option<f32>,
    pub respawn_aspect_threshold: Option<f32>,
}

impl EngineConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_patch_only_touches_named_fields() {
        let mut config = EngineConfig::default();
        let respawn = config
            .apply(&EngineConfigPatch {
                mouse_force: Some(1.5),
                ..Default::default()
            })
            .unwrap();
        assert!(!respawn);
        assert_eq!(config.mouse_force, 1.5);
        assert_eq!(config.firefly_count, 200);
        assert_eq!(config.mouse_radius, 200.0);
    }

    #[test]
    fn test_population_fields_request_respawn() {
        let mut config = EngineConfig::default();
        let patch = EngineConfigPatch {
            firefly_count: Some(50),
            ..Default::default()
        };
        assert!(config.apply(&patch).unwrap());
        // Same value again is not a change
        assert!(!config.apply(&patch).unwrap());

        let patch = EngineConfigPatch {
            ui_avoidance_enabled: Some(false),
            ..Default::default()
        };
        assert!(config.apply(&patch).unwrap());
    }

    #[test]
    fn test_invalid_patch_is_rejected_whole() {
        let mut config = EngineConfig::default();
        let patch = EngineConfigPatch {
            mouse_force: Some(2.0),
            mouse_radius: Some(-1.0),
            ..Default::default()
        };
        assert!(config.apply(&patch).is_err());
        assert_eq!(config, EngineConfig::default());
    }
}
