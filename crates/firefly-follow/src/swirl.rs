//! Letter swirl: text dissolves into a spiral of glowing particles and
//! settles back

use bytemuck::{Pod, Zeroable};
use firefly_core::{
    Camera, Color, ElementKey, FireflyError, LayoutNode, LayoutSnapshot, Result, SceneRng, Selector, TransformSink,
    Vec3,
};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

const CORAL: u32 = 0xff6b6b;
const YELLOW: u32 = 0xfbbf24;

/// Parameters for `SwirlEngine`, parsed from the `[swirl]` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwirlConfig {
    pub particles_per_letter: usize,
    /// World units
    pub swirl_radius: f32,
    /// Radians per second
    pub swirl_speed: f32,
    /// Seconds spent spiralling before the return
    pub swirl_duration: f32,
    pub particle_size: f32,
    /// Seconds the particles take to reach full alpha
    pub fade_in_time: f32,
    /// Seconds the return to the letters takes
    pub fade_out_time: f32,
    pub spiral_expansion: f32,
    pub glow_intensity: f32,
    /// Particles across every active swirl
    pub max_particles: usize,
    /// Candidates for `trigger_random`
    pub selectors: Vec<String>,
}

impl Default for SwirlConfig {
    fn default() -> Self {
        Self {
            particles_per_letter: 20,
            swirl_radius: 100.0,
            swirl_speed: 2.0,
            swirl_duration: 3.0,
            particle_size: 3.0,
            fade_in_time: 0.3,
            fade_out_time: 0.5,
            spiral_expansion: 1.5,
            glow_intensity: 2.0,
            max_particles: 1000,
            selectors: vec![".band-name".into(), ".venue-name".into(), ".date-display".into()],
        }
    }
}

impl SwirlConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [
            ("swirl.swirl_duration", self.swirl_duration),
            ("swirl.fade_out_time", self.fade_out_time),
            ("swirl.particle_size", self.particle_size),
        ] {
            if !(v > 0.0 && v.is_finite()) {
                return Err(FireflyError::invalid(field, "must be positive"));
            }
        }
        if !(self.fade_in_time >= 0.0 && self.fade_in_time.is_finite()) {
            return Err(FireflyError::invalid("swirl.fade_in_time", "must be a non-negative number"));
        }
        FireflyError::check_range("swirl.particles_per_letter", self.particles_per_letter as f64, 1.0, 1000.0)?;
        for s in &self.selectors {
            Selector::parse(s)?;
        }
        Ok(())
    }

    pub fn merged(&self, patch: &SwirlConfigPatch) -> Self {
        Self {
            particles_per_letter: patch.particles_per_letter.unwrap_or(self.particles_per_letter),
            swirl_radius: patch.swirl_radius.unwrap_or(self.swirl_radius),
            swirl_speed: patch.swirl_speed.unwrap_or(self.swirl_speed),
            swirl_duration: patch.swirl_duration.unwrap_or(self.swirl_duration),
            particle_size: patch.particle_size.unwrap_or(self.particle_size),
            fade_in_time: patch.fade_in_time.unwrap_or(self.fade_in_time),
            fade_out_time: patch.fade_out_time.unwrap_or(self.fade_out_time),
            spiral_expansion: patch.spiral_expansion.unwrap_or(self.spiral_expansion),
            ..self.clone()
        }
    }
}

/// Per-swirl overrides of `SwirlConfig`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwirlConfigPatch {
    pub particles_per_letter: Option<usize>,
    pub swirl_radius: Option<f32>,
    pub swirl_speed: Option<f32>,
    pub swirl_duration: Option<f32>,
    pub particle_size: Option<f32>,
    pub fade_in_time: Option<f32>,
    pub fade_out_time: Option<f32>,
    pub spiral_expansion: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SwirlId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SwirlPhase {
    Swirling,
    /// `elapsed` counts seconds since the return began
    Returning { elapsed: f32 },
}

#[derive(Clone, Debug)]
pub struct SwirlParticle {
    /// The letter this particle settles back onto
    pub origin: Vec3,
    pub position: Vec3,
    pub color: Color,
    pub size: f32,
    pub alpha: f32,
    phase: f32,
    radius: f32,
    speed: f32,
    spiral_offset: f32,
    pub lifetime: f32,
}

struct Swirl {
    id: SwirlId,
    key: ElementKey,
    config: SwirlConfig,
    center: Vec3,
    elapsed: f32,
    phase: SwirlPhase,
    particles: Vec<SwirlParticle>,
}

impl Swirl {
    /// Returns true once the swirl has fully settled
    fn update(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        let c = &self.config;

        match self.phase {
            SwirlPhase::Swirling => {
                let progress = self.elapsed / c.swirl_duration;
                let fade_in = c.fade_in_time / c.swirl_duration;
                for p in &mut self.particles {
                    p.lifetime += dt;
                    let t = p.lifetime * p.speed;
                    let radius = p.radius * (1.0 + c.spiral_expansion * progress);
                    let angle = p.spiral_offset + t;
                    p.position = self.center
                        + Vec3::new(
                            radius * angle.cos() * progress + (t * 3.0 + p.phase).sin() * 5.0,
                            radius * angle.sin() * progress + (t * 2.0 + p.phase).cos() * 5.0,
                            progress * 50.0 * (t * 2.0).sin(),
                        );
                    p.alpha = if progress < fade_in {
                        progress / fade_in
                    } else if progress > 0.8 {
                        ((1.0 - progress) * 5.0).max(0.0)
                    } else {
                        1.0
                    };
                }
                if progress >= 1.0 {
                    self.phase = SwirlPhase::Returning { elapsed: 0.0 };
                }
                false
            }
            SwirlPhase::Returning { elapsed } => {
                let elapsed = elapsed + dt;
                let q = elapsed / c.fade_out_time;
                for p in &mut self.particles {
                    p.lifetime += dt;
                    if q >= 1.0 {
                        p.position = p.origin;
                        p.alpha = 0.0;
                    } else {
                        p.position = p.position.lerp(p.origin, ease_in_out_cubic(q) * 0.1);
                        p.alpha = 1.0 - q;
                    }
                }
                self.phase = SwirlPhase::Returning { elapsed };
                q >= 1.0
            }
        }
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// One swirl particle as the point-sprite pass reads it. 48 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SwirlInstance {
    pub pos_size: [f32; 4],    // xyz = position, w = size
    pub color_alpha: [f32; 4], // rgb, a = alpha
    pub time_glow: [f32; 4],   // x = lifetime, y = glow intensity
}

/// Runs every active swirl and queues the element visibility changes
pub struct SwirlEngine {
    config: SwirlConfig,
    rng: SceneRng,
    swirls: Vec<Swirl>,
    next_id: u64,
    opacity_writes: Vec<(ElementKey, f32)>,
    instances: Vec<SwirlInstance>,
}

impl SwirlEngine {
    pub fn new(config: SwirlConfig, rng: SceneRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            swirls: Vec::new(),
            next_id: 1,
            opacity_writes: Vec::new(),
            instances: Vec::new(),
        })
    }

    /// Dissolve `key` into swirl particles and hide it.
    ///
    /// `Ok(None)` when the element is already swirling, the particle budget
    /// is spent, or its center does not reach the z=0 plane.
    pub fn start(
        &mut self,
        key: &ElementKey,
        layout: &LayoutSnapshot,
        camera: &Camera,
        overrides: &SwirlConfigPatch,
    ) -> Result<Option<SwirlId>> {
        let node = layout
            .get(key)
            .ok_or_else(|| FireflyError::UnknownElement(key.to_string()))?;
        if self.is_swirling(key) {
            log::debug!("'{key}' is already swirling");
            return Ok(None);
        }

        let config = self.config.merged(overrides);
        config.validate()?;

        let c = node.rect.center();
        let Some(center) = camera.screen_to_plane(c.x, c.y) else {
            log::warn!("Swirl center for '{key}' does not reach the z=0 plane");
            return Ok(None);
        };

        let budget = self.config.max_particles.saturating_sub(self.particle_count());
        if budget == 0 {
            log::debug!("Swirl particle budget spent, skipping '{key}'");
            return Ok(None);
        }

        let element_color = node.color.unwrap_or(Color::WHITE);
        let letters: Vec<&LayoutNode> = if node.letters.is_empty() {
            vec![node]
        } else {
            node.letters.iter().filter_map(|k| layout.get(k)).collect()
        };

        let mut particles = Vec::new();
        'letters: for letter in letters {
            let lc = letter.rect.center();
            let origin = camera.screen_to_plane(lc.x, lc.y).unwrap_or(center);
            let color = letter_color(letter, element_color);
            for _ in 0..config.particles_per_letter {
                if particles.len() >= budget {
                    break 'letters;
                }
                particles.push(SwirlParticle {
                    origin,
                    position: origin,
                    color,
                    size: config.particle_size * self.rng.range(0.5, 1.0),
                    alpha: 0.0,
                    phase: self.rng.angle(),
                    radius: config.swirl_radius * self.rng.range(0.8, 1.2),
                    speed: config.swirl_speed * self.rng.range(0.8, 1.2),
                    spiral_offset: self.rng.next_f32() * TAU,
                    lifetime: 0.0,
                });
            }
        }

        let id = SwirlId(self.next_id);
        self.next_id += 1;
        log::debug!("Swirl {:?} on '{key}' with {} particles", id, particles.len());
        self.opacity_writes.push((key.clone(), 0.0));
        self.swirls.push(Swirl {
            id,
            key: key.clone(),
            config,
            center,
            elapsed: 0.0,
            phase: SwirlPhase::Swirling,
            particles,
        });
        Ok(Some(id))
    }

    /// Start a swirl on a random element matching the configured selectors
    /// that is not already swirling
    pub fn trigger_random(&mut self, layout: &LayoutSnapshot, camera: &Camera) -> Result<Option<SwirlId>> {
        let mut candidates: Vec<ElementKey> = Vec::new();
        for s in &self.config.selectors {
            let selector = Selector::parse(s)?;
            for node in layout.select(&selector) {
                if !self.is_swirling(&node.key) && !candidates.contains(&node.key) {
                    candidates.push(node.key.clone());
                }
            }
        }
        if candidates.is_empty() {
            return Ok(None);
        }
        let key = candidates.swap_remove(self.rng.index(candidates.len()));
        self.start(&key, layout, camera, &SwirlConfigPatch::default())
    }

    pub fn update(&mut self, dt: f32) {
        let mut finished = Vec::new();
        for swirl in &mut self.swirls {
            if swirl.update(dt) {
                finished.push(swirl.id);
            }
        }
        for id in finished {
            if let Some(pos) = self.swirls.iter().position(|s| s.id == id) {
                let swirl = self.swirls.remove(pos);
                self.opacity_writes.push((swirl.key, 1.0));
            }
        }
    }

    /// Flush queued visibility changes to the sink
    pub fn apply_to(&mut self, sink: &mut dyn TransformSink) {
        for (key, opacity) in self.opacity_writes.drain(..) {
            sink.set_opacity(&key, opacity);
        }
    }

    /// Drop every swirl and show its element again
    pub fn clear(&mut self) {
        for swirl in self.swirls.drain(..) {
            self.opacity_writes.push((swirl.key, 1.0));
        }
        self.instances.clear();
    }

    pub fn pack_instances(&mut self) -> &[SwirlInstance] {
        self.instances.clear();
        for swirl in &self.swirls {
            let glow = swirl.config.glow_intensity;
            self.instances.extend(swirl.particles.iter().map(|p| SwirlInstance {
                pos_size: [p.position.x, p.position.y, p.position.z, p.size],
                color_alpha: [p.color.r, p.color.g, p.color.b, p.alpha],
                time_glow: [p.lifetime, glow, 0.0, 0.0],
            }));
        }
        &self.instances
    }

    pub fn is_swirling(&self, key: &ElementKey) -> bool {
        self.swirls.iter().any(|s| &s.key == key)
    }

    pub fn phase(&self, id: SwirlId) -> Option<SwirlPhase> {
        self.swirls.iter().find(|s| s.id == id).map(|s| s.phase)
    }

    pub fn particles(&self, id: SwirlId) -> Option<&[SwirlParticle]> {
        self.swirls.iter().find(|s| s.id == id).map(|s| s.particles.as_slice())
    }

    pub fn active_count(&self) -> usize {
        self.swirls.len()
    }

    pub fn particle_count(&self) -> usize {
        self.swirls.iter().map(|s| s.particles.len()).sum()
    }

    pub fn config(&self) -> &SwirlConfig {
        &self.config
    }
}

fn letter_color(letter: &LayoutNode, element_color: Color) -> Color {
    if letter.has_class("coral") {
        Color::from_hex(CORAL)
    } else if letter.has_class("yellow") {
        Color::from_hex(YELLOW)
    } else {
        letter.color.unwrap_or(element_color)
    }
}
