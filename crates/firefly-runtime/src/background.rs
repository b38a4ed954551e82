//! Parallax background layers
//!
//! Only the per-layer uniforms are computed here; the painterly shader that
//! consumes them lives with the renderer.

use crate::system::FrameSystem;
use firefly_core::{Color, FireflyError, Result, Vec3, Viewport};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Static description of one layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Resting depth of the layer plane
    pub z: f32,
    /// Side length of the layer plane in world units
    pub scale: f32,
    pub opacity: f32,
    pub swirls: u32,
    pub brush_density: u32,
    pub color_shift: f32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            z: -1200.0,
            scale: 3000.0,
            opacity: 1.0,
            swirls: 4,
            brush_density: 8,
            color_shift: 0.0,
        }
    }
}

/// Parameters for `Background`, parsed from the `[background]` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Back to front
    pub layers: Vec<LayerConfig>,
    /// Multiplier on every layer's opacity
    pub intensity: f32,
    /// Tilt of the whole layer group about X
    pub group_tilt: f32,
    pub fog_color: Color,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                LayerConfig::default(),
                LayerConfig {
                    z: -900.0,
                    scale: 2500.0,
                    opacity: 0.85,
                    swirls: 3,
                    brush_density: 6,
                    color_shift: 0.1,
                },
                LayerConfig {
                    z: -600.0,
                    scale: 2000.0,
                    opacity: 0.7,
                    swirls: 2,
                    brush_density: 4,
                    color_shift: 0.2,
                },
            ],
            intensity: 1.0,
            group_tilt: -0.05,
            fog_color: Color::from_hex(0x0a0a2e),
            fog_near: 1.0,
            fog_far: 1000.0,
        }
    }
}

impl BackgroundConfig {
    pub fn validate(&self) -> Result<()> {
        FireflyError::check_range("background.intensity", self.intensity as f64, 0.0, 10.0)?;
        if !(self.fog_near >= 0.0 && self.fog_far > self.fog_near) {
            return Err(FireflyError::invalid(
                "background.fog_far",
                "must be greater than fog_near",
            ));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            FireflyError::check_range(&format!("background.layers[{i}].opacity"), layer.opacity as f64, 0.0, 1.0)?;
            if !(layer.scale > 0.0) {
                return Err(FireflyError::invalid(format!("background.layers[{i}].scale"), "must be positive"));
            }
        }
        Ok(())
    }
}

/// Runtime changes to the background
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundPatch {
    pub intensity: Option<f32>,
    pub fog_color: Option<Color>,
    pub fog_near: Option<f32>,
    pub fog_far: Option<f32>,
}

impl BackgroundPatch {
    pub fn is_empty(&self) -> bool {
        self.intensity.is_none() && self.fog_color.is_none() && self.fog_near.is_none() && self.fog_far.is_none()
    }
}

/// Uniforms of one layer for the current frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerState {
    pub time: f32,
    /// Euler rotation in radians (x, y; z is unused)
    pub rotation: Vec3,
    pub position: Vec3,
    pub opacity: f32,
    pub scale: f32,
    pub swirls: u32,
    pub brush_density: u32,
    pub color_shift: f32,
}

#[derive(Clone, Debug)]
pub struct Background {
    config: BackgroundConfig,
    resolution: Viewport,
    time: f32,
    layers: Vec<LayerState>,
}

impl Background {
    pub fn new(config: BackgroundConfig, resolution: Viewport) -> Result<Self> {
        config.validate()?;
        let mut background = Self {
            config,
            resolution,
            time: 0.0,
            layers: Vec::new(),
        };
        background.layers = background
            .config
            .layers
            .iter()
            .map(|l| LayerState {
                time: 0.0,
                rotation: Vec3::ZERO,
                position: Vec3::new(0.0, 0.0, l.z),
                opacity: l.opacity,
                scale: l.scale,
                swirls: l.swirls,
                brush_density: l.brush_density,
                color_shift: l.color_shift,
            })
            .collect();
        background.update(0.0);
        Ok(background)
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        let t = self.time;
        let intensity = self.config.intensity;

        for (i, (state, layer)) in self.layers.iter_mut().zip(&self.config.layers).enumerate() {
            let fi = i as f32;
            let sway = 0.02 * (fi + 1.0);
            state.time = t * (1.0 - 0.1 * fi);
            state.rotation = Vec3::new(
                self.config.group_tilt + (0.2 * t + fi).sin() * sway,
                (0.15 * t + 0.5 * fi).cos() * sway * 0.5,
                0.0,
            );
            state.position.z = layer.z + 20.0 * (0.1 * t + fi * FRAC_PI_2).sin();
            state.opacity = layer.opacity * intensity;
        }
    }

    /// Scale every layer's opacity; takes effect immediately
    pub fn set_intensity(&mut self, intensity: f32) {
        self.config.intensity = intensity.max(0.0);
        for (state, layer) in self.layers.iter_mut().zip(&self.config.layers) {
            state.opacity = layer.opacity * self.config.intensity;
        }
    }

    pub fn set_resolution(&mut self, resolution: Viewport) {
        self.resolution = resolution;
    }

    /// Apply a runtime patch. An inconsistent fog range is rejected whole.
    pub fn apply(&mut self, patch: &BackgroundPatch) -> Result<()> {
        let mut next = self.config.clone();
        if let Some(c) = patch.fog_color {
            next.fog_color = c;
        }
        if let Some(n) = patch.fog_near {
            next.fog_near = n;
        }
        if let Some(f) = patch.fog_far {
            next.fog_far = f;
        }
        if let Some(i) = patch.intensity {
            next.intensity = i;
        }
        if let Err(e) = next.validate() {
            log::warn!("Rejected background patch: {e}");
            return Err(e);
        }
        self.config = next;
        self.set_intensity(self.config.intensity);
        Ok(())
    }

    pub fn layers(&self) -> &[LayerState] {
        &self.layers
    }

    pub fn resolution(&self) -> Viewport {
        self.resolution
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.config
    }
}

impl FrameSystem for Background {
    fn update(&mut self, dt: f32) {
        Background::update(self, dt);
    }

    fn name(&self) -> &str {
        "background"
    }
}
