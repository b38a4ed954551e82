//! Firefly population and per-frame update

use crate::config::{EngineConfig, EngineConfigPatch};
use crate::firefly::{wrap_position, Firefly, FireflyParams, PointerForce, MAX_INTENSITY, MIN_INTENSITY};
use crate::instance::{FireflyInstance, FireflyUniforms};
use firefly_boundary::{BoundaryIndex, DEFAULT_SAFE_ATTEMPTS};
use firefly_core::{Result, SceneRng, Vec3};
use serde::Serialize;

/// Owns every firefly and the random stream that drives them
pub struct ParticleEngine {
    config: EngineConfig,
    fireflies: Vec<Firefly>,
    rng: SceneRng,
    instances: Vec<FireflyInstance>,
    elapsed: f32,
}

/// Aggregate view of the population, for diagnostics
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub count: usize,
    pub bursting: usize,
    pub avoiding: usize,
    pub min_intensity: f32,
    pub max_intensity: f32,
    pub mean_intensity: f32,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

impl ParticleEngine {
    /// An empty engine; call `respawn` to populate it
    pub fn new(config: EngineConfig, rng: SceneRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fireflies: Vec::new(),
            rng,
            instances: Vec::new(),
            elapsed: 0.0,
        })
    }

    /// Replace the whole population. The new set is built aside and swapped
    /// in, so no caller ever sees a partial population.
    ///
    /// `tree_points` are world-space anchors; `boundaries`, when given and
    /// avoidance is enabled, moves spawns out of UI regions and binds each
    /// particle to steer around them.
    pub fn respawn(&mut self, tree_points: &[Vec3], boundaries: Option<&BoundaryIndex>) {
        let avoid = if self.config.ui_avoidance_enabled { boundaries } else { None };

        let mut next = Vec::with_capacity(self.config.firefly_count);
        let mut from_tree = 0usize;
        for index in 0..self.config.firefly_count {
            let seeded_on_tree = !tree_points.is_empty() && self.rng.chance(self.config.tree_spawn_ratio);
            let mut position = if seeded_on_tree {
                from_tree += 1;
                let anchor = tree_points[self.rng.index(tree_points.len())];
                let j = self.config.tree_spawn_jitter;
                anchor + Vec3::new(self.rng.signed(j), self.rng.signed(j), self.rng.signed(j))
            } else {
                let half = self.config.spawn_extent * 0.5;
                Vec3::new(self.rng.signed(half.x), self.rng.signed(half.y), self.rng.signed(half.z))
            };

            if let Some(index) = avoid {
                position = index.find_safe_position(position, DEFAULT_SAFE_ATTEMPTS);
            }

            let params = FireflyParams::random(&mut self.rng);
            let mut firefly = Firefly::new(index, wrap_position(position), params, &mut self.rng);
            if avoid.is_some() {
                firefly.bind_avoidance(self.config.ui_avoidance_strength);
            }
            next.push(firefly);
        }

        let previous = std::mem::replace(&mut self.fireflies, next);
        log::info!(
            "Spawned {} fireflies ({} on tree anchors, avoidance {}), replaced {}",
            self.fireflies.len(),
            from_tree,
            if avoid.is_some() { "on" } else { "off" },
            previous.len()
        );
    }

    /// Advance every firefly by `dt` seconds.
    ///
    /// `pointer` is the pointer's world position on the z=0 plane, or
    /// `None` when there is no interaction.
    pub fn update(&mut self, dt: f32, pointer: Option<Vec3>, boundaries: Option<&BoundaryIndex>) {
        self.elapsed += dt;
        let force = pointer.map(|position| PointerForce {
            position,
            radius: self.config.mouse_radius,
            force: self.config.mouse_force,
        });

        for firefly in &mut self.fireflies {
            firefly.update(dt, &mut self.rng, force.as_ref(), boundaries);
        }
    }

    /// Apply a runtime patch. Returns whether the caller should `respawn`.
    pub fn apply_patch(&mut self, patch: &EngineConfigPatch) -> Result<bool> {
        // Pointer tuning takes effect on the next update
        self.config.apply(patch)
    }

    /// Whether a viewport aspect change is large enough to repopulate
    pub fn needs_respawn_for_aspect(&self, old_aspect: f32, new_aspect: f32) -> bool {
        if old_aspect <= 0.0 {
            return true;
        }
        ((new_aspect - old_aspect) / old_aspect).abs() > self.config.respawn_aspect_threshold
    }

    /// Refresh and return the instance buffer
    pub fn pack_instances(&mut self) -> &[FireflyInstance] {
        let scale = self.config.firefly_scale;
        self.instances.clear();
        self.instances
            .extend(self.fireflies.iter().map(|f| FireflyInstance::from_firefly(f, scale)));
        &self.instances
    }

    pub fn instance_data(&self) -> &[FireflyInstance] {
        &self.instances
    }

    /// Shader constants for the current frame
    pub fn uniforms(&self) -> FireflyUniforms {
        FireflyUniforms::new(self.config.glow_strength, self.config.core_size, self.elapsed)
    }

    pub fn stats(&self) -> EngineStats {
        if self.fireflies.is_empty() {
            return EngineStats::default();
        }
        let mut stats = EngineStats {
            count: self.fireflies.len(),
            min_intensity: MAX_INTENSITY,
            max_intensity: MIN_INTENSITY,
            bounds_min: [f32::MAX; 3],
            bounds_max: [f32::MIN; 3],
            ..Default::default()
        };
        let mut total = 0.0;
        for f in &self.fireflies {
            let i = f.intensity();
            total += i;
            stats.min_intensity = stats.min_intensity.min(i);
            stats.max_intensity = stats.max_intensity.max(i);
            if f.is_bursting() {
                stats.bursting += 1;
            }
            if f.avoidance_strength().is_some() {
                stats.avoiding += 1;
            }
            let p = f.position().to_array();
            for axis in 0..3 {
                stats.bounds_min[axis] = stats.bounds_min[axis].min(p[axis]);
                stats.bounds_max[axis] = stats.bounds_max[axis].max(p[axis]);
            }
        }
        stats.mean_intensity = total / self.fireflies.len() as f32;
        stats
    }

    /// Drop every firefly and its instance data
    pub fn clear(&mut self) {
        self.fireflies.clear();
        self.instances.clear();
    }

    pub fn fireflies(&self) -> &[Firefly] {
        &self.fireflies
    }

    pub fn fireflies_mut(&mut self) -> &mut [Firefly] {
        &mut self.fireflies
    }

    pub fn get(&self, index: usize) -> Option<&Firefly> {
        self.fireflies.get(index)
    }

    pub fn len(&self) -> usize {
        self.fireflies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fireflies.is_empty()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
