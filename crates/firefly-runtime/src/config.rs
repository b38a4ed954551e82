//! Scene configuration: one TOML document covering every engine

use crate::background::{BackgroundConfig, BackgroundPatch};
use firefly_boundary::BoundaryConfig;
use firefly_core::{CameraConfig, FireflyError, Result, Selector};
use firefly_follow::{FollowConfig, FollowConfigPatch, SwirlConfig, SwirlConfigPatch};
use firefly_particles::{EngineConfig, EngineConfigPatch};
use firefly_tree::TreeConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pointer gesture that starts a swirl
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerEvent {
    /// Pointer enters the element
    Hover,
    Click,
}

/// Starts a swirl on elements matching `selector`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwirlTrigger {
    pub selector: String,
    pub on: TriggerEvent,
    #[serde(default)]
    pub overrides: SwirlConfigPatch,
}

/// How pointer input and time drive the text effects
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Elements registered with the follow engine at startup
    pub follow_selectors: Vec<String>,
    /// Seconds between automatic random swirls; 0 disables them
    pub auto_swirl_interval: f32,
    pub swirl_triggers: Vec<SwirlTrigger>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            follow_selectors: vec![".band-name".into(), ".tagline".into()],
            auto_swirl_interval: 8.0,
            swirl_triggers: vec![
                SwirlTrigger {
                    selector: ".band-name".into(),
                    on: TriggerEvent::Hover,
                    overrides: SwirlConfigPatch::default(),
                },
                SwirlTrigger {
                    selector: ".venue-name".into(),
                    on: TriggerEvent::Click,
                    overrides: SwirlConfigPatch {
                        particles_per_letter: Some(25),
                        swirl_radius: Some(120.0),
                        swirl_duration: Some(3.5),
                        particle_size: Some(3.5),
                        ..Default::default()
                    },
                },
                SwirlTrigger {
                    selector: ".date-display".into(),
                    on: TriggerEvent::Hover,
                    overrides: SwirlConfigPatch {
                        particles_per_letter: Some(20),
                        swirl_radius: Some(90.0),
                        swirl_speed: Some(2.5),
                        ..Default::default()
                    },
                },
            ],
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.auto_swirl_interval >= 0.0 && self.auto_swirl_interval.is_finite()) {
            return Err(FireflyError::invalid(
                "interaction.auto_swirl_interval",
                "must be zero or positive",
            ));
        }
        for s in &self.follow_selectors {
            Selector::parse(s)?;
        }
        for t in &self.swirl_triggers {
            Selector::parse(&t.selector)?;
        }
        Ok(())
    }
}

/// The complete scene configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
    pub camera: CameraConfig,
    pub tree: TreeConfig,
    pub boundary: BoundaryConfig,
    pub particles: EngineConfig,
    pub follow: FollowConfig,
    pub swirl: SwirlConfig,
    pub background: BackgroundConfig,
    pub interaction: InteractionConfig,
}

impl SceneConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        FireflyError::check_range("camera.fov", cam.fov as f64, 1.0, 179.0)?;
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(FireflyError::invalid("camera.far", "must be greater than camera.near > 0"));
        }
        self.tree.validate()?;
        self.boundary.validate()?;
        self.particles.validate()?;
        self.follow.validate()?;
        self.swirl.validate()?;
        self.background.validate()?;
        self.interaction.validate()?;
        for trigger in &self.interaction.swirl_triggers {
            self.swirl.merged(&trigger.overrides).validate()?;
        }
        Ok(())
    }
}

/// Runtime changes routed by `Scene::apply_patch`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenePatch {
    pub particles: EngineConfigPatch,
    pub follow: FollowConfigPatch,
    /// New UI boundary padding in pixels
    pub boundary_padding: Option<f32>,
    pub background: BackgroundPatch,
}

impl ScenePatch {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
            && self.follow.is_empty()
            && self.boundary_padding.is_none()
            && self.background.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SceneConfig::default();
        config.seed = Some(42);
        config.particles.firefly_count = 120;
        let text = config.to_toml_string().unwrap();
        let parsed = SceneConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let text = r#"
seed = 7

[particles]
firefly_count = 120
mouse_radius = 150.0
mouse_force = 0.4

[background]
fog_near = 50.0
fog_far = 600.0
"#;
        let config = SceneConfig::from_toml_str(text).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.particles.firefly_count, 120);
        assert_eq!(config.particles.firefly_scale, 1.0);
        assert_eq!(config.tree.depth, 3);
        assert_eq!(config.background.layers.len(), 3);
        assert_eq!(config.interaction.swirl_triggers.len(), 3);
    }

    #[test]
    fn test_invalid_sections_rejected() {
        assert!(SceneConfig::from_toml_str("[tree]\ndepth = 20\n").is_err());
        assert!(SceneConfig::from_toml_str("[follow]\ndamping = 1.5\n").is_err());
        assert!(SceneConfig::from_toml_str("[interaction]\nfollow_selectors = [\"div p\"]\n").is_err());
        assert!(matches!(
            SceneConfig::from_toml_str("particles = 3"),
            Err(FireflyError::TomlParseError(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SceneConfig::load("/nonexistent/firefly.toml").unwrap_err();
        assert!(matches!(err, FireflyError::IoError(_)));
    }

    #[test]
    fn test_scene_patch_from_toml() {
        let patch = ScenePatch::from_toml_str(
            "boundary_padding = 80.0\n[particles]\nfirefly_count = 50\n[follow]\ndamping = 0.9\n",
        )
        .unwrap();
        assert_eq!(patch.particles.firefly_count, Some(50));
        assert_eq!(patch.follow.damping, Some(0.9));
        assert_eq!(patch.boundary_padding, Some(80.0));
        assert!(!patch.is_empty());
        assert!(ScenePatch::default().is_empty());
    }
}
