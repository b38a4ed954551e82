//! Scene: owns every engine and runs them in a fixed per-frame order

use crate::background::Background;
use crate::config::{SceneConfig, ScenePatch, TriggerEvent};
use crate::pointer::{PointerEvent, PointerState};
use crate::system::FrameSystem;
use firefly_boundary::BoundaryIndex;
use firefly_core::{
    Camera, ElementKey, FireflyError, LayoutSnapshot, Result, SceneRng, Selector, TransformSink, Vec2, Viewport,
};
use firefly_follow::{FollowConfigPatch, SwirlEngine, SwirlId, SwirlInstance, TextFollowEngine};
use firefly_particles::{EngineStats, FireflyInstance, FireflyUniforms, ParticleEngine};
use firefly_tree::Tree;
use serde::Serialize;
use std::collections::BTreeSet;

/// What `Scene::apply_patch` changed beyond the configs themselves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    pub respawned: bool,
    /// Boundary count after a padding change
    pub boundaries_refreshed: Option<usize>,
}

/// Snapshot of scene state for diagnostics
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneStats {
    pub frames: u64,
    pub elapsed: f32,
    pub particles: EngineStats,
    pub boundaries: usize,
    pub follow_elements: usize,
    pub active_swirls: usize,
    pub swirl_particles: usize,
    pub tree_branches: usize,
}

pub struct Scene {
    config: SceneConfig,
    camera: Camera,
    tree: Tree,
    background: Background,
    boundaries: BoundaryIndex,
    particles: ParticleEngine,
    follow: TextFollowEngine,
    swirls: SwirlEngine,
    pointer: PointerState,
    systems: Vec<Box<dyn FrameSystem>>,
    layout: LayoutSnapshot,
    hovered: BTreeSet<ElementKey>,
    swirl_timer: f32,
    frames: u64,
    elapsed: f32,
    running: bool,
}

impl Scene {
    /// Build every engine from `config` and populate the particles.
    /// Elements matching the follow selectors are registered from `layout`.
    pub fn new(config: SceneConfig, layout: &LayoutSnapshot) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => SceneRng::seeded(seed),
            None => SceneRng::from_entropy(),
        };
        let camera = Camera::new(config.camera.clone(), layout.viewport);
        let tree = Tree::generate(&config.tree, &mut rng.fork())?;
        let background = Background::new(config.background.clone(), layout.viewport)?;

        let mut boundaries = BoundaryIndex::new(config.boundary.clone())?;
        boundaries.refresh(layout, &camera);

        let mut particles = ParticleEngine::new(config.particles.clone(), rng.fork())?;
        particles.respawn(&tree.spawn_points(), Some(&boundaries));

        let mut follow = TextFollowEngine::new(config.follow.clone())?;
        for selector in &config.interaction.follow_selectors {
            follow.register_selector(selector, layout, &FollowConfigPatch::default())?;
        }

        let swirls = SwirlEngine::new(config.swirl.clone(), rng.fork())?;

        log::info!(
            "Scene ready: {} fireflies, {} branches, {} boundaries, {} follow elements",
            particles.len(),
            tree.branches().len(),
            boundaries.len(),
            follow.len()
        );

        Ok(Self {
            config,
            camera,
            tree,
            background,
            boundaries,
            particles,
            follow,
            swirls,
            pointer: PointerState::new(),
            systems: Vec::new(),
            layout: layout.clone(),
            hovered: BTreeSet::new(),
            swirl_timer: 0.0,
            frames: 0,
            elapsed: 0.0,
            running: true,
        })
    }

    /// Run one frame and push the resulting transforms to `sink`.
    /// A no-op after `shutdown`.
    pub fn frame(&mut self, dt: f32, layout: &LayoutSnapshot, sink: &mut dyn TransformSink) {
        if !self.running {
            return;
        }
        if &self.layout != layout {
            self.layout = layout.clone();
        }

        for system in [&mut self.tree as &mut dyn FrameSystem, &mut self.background] {
            system.update(dt);
        }

        let world_pointer = self.pointer.world(&self.camera);
        self.particles.update(dt, world_pointer, Some(&self.boundaries));

        self.follow.update(dt, self.pointer.screen(), &self.layout);

        self.run_swirl_triggers(dt);
        self.swirls.update(dt);

        for system in &mut self.systems {
            system.update(dt);
        }

        self.follow.apply_to(sink);
        self.swirls.apply_to(sink);
        self.particles.pack_instances();

        self.frames += 1;
        self.elapsed += dt;
    }

    fn run_swirl_triggers(&mut self, dt: f32) {
        let interval = self.config.interaction.auto_swirl_interval;
        if interval > 0.0 {
            self.swirl_timer += dt;
            if self.swirl_timer >= interval {
                self.swirl_timer -= interval;
                if let Err(e) = self.swirls.trigger_random(&self.layout, &self.camera) {
                    log::warn!("Automatic swirl failed: {e}");
                }
            }
        }

        let clicks = self.pointer.take_clicks();
        let pointer = self.pointer.screen();
        let mut now_hovered = BTreeSet::new();
        let mut starts = Vec::new();

        for trigger in &self.config.interaction.swirl_triggers {
            // Selectors were validated with the config
            let Ok(selector) = Selector::parse(&trigger.selector) else {
                continue;
            };
            for node in self.layout.select(&selector) {
                let hit = match trigger.on {
                    TriggerEvent::Hover => match pointer {
                        Some(p) if node.rect.contains(p) => {
                            now_hovered.insert(node.key.clone());
                            !self.hovered.contains(&node.key)
                        }
                        _ => false,
                    },
                    TriggerEvent::Click => clicks.iter().any(|c| node.rect.contains(*c)),
                };
                if hit && !self.swirls.is_swirling(&node.key) {
                    starts.push((node.key.clone(), trigger.overrides.clone()));
                }
            }
        }
        self.hovered = now_hovered;

        for (key, overrides) in starts {
            if let Err(e) = self.swirls.start(&key, &self.layout, &self.camera, &overrides) {
                log::warn!("Swirl on '{key}' failed: {e}");
            }
        }
    }

    /// Handle a viewport change. Returns whether the particles were respawned.
    pub fn resize(&mut self, width: f32, height: f32, layout: &LayoutSnapshot) -> bool {
        if !self.running {
            return false;
        }
        let old_aspect = self.camera.aspect();
        let viewport = Viewport::new(width, height);
        self.camera.set_viewport(viewport);
        self.background.set_resolution(viewport);
        self.layout = layout.clone();
        self.layout.viewport = viewport;

        self.boundaries.refresh(&self.layout, &self.camera);
        self.follow.resync(&self.layout);

        if self.particles.needs_respawn_for_aspect(old_aspect, self.camera.aspect()) {
            self.particles
                .respawn(&self.tree.spawn_points(), Some(&self.boundaries));
            true
        } else {
            false
        }
    }

    /// Route a partial config update. Every section is checked before any
    /// is applied, so a rejected patch leaves the scene unchanged.
    pub fn apply_patch(&mut self, patch: &ScenePatch) -> Result<PatchOutcome> {
        if let Some(padding) = patch.boundary_padding {
            FireflyError::check_range("boundary.padding", padding as f64, 0.0, 10_000.0)?;
        }
        self.particles.config().clone().apply(&patch.particles)?;
        self.follow.config().merged(&patch.follow).validate()?;
        self.background.clone().apply(&patch.background)?;

        let mut outcome = PatchOutcome::default();
        if self.particles.apply_patch(&patch.particles)? {
            self.particles
                .respawn(&self.tree.spawn_points(), Some(&self.boundaries));
            outcome.respawned = true;
        }
        self.follow.set_config(&patch.follow)?;
        self.background.apply(&patch.background)?;
        if let Some(padding) = patch.boundary_padding {
            let n = self.boundaries.set_padding(padding, &self.layout, &self.camera);
            outcome.boundaries_refreshed = Some(n);
        }

        self.config.particles = self.particles.config().clone();
        self.config.follow = self.follow.config().clone();
        self.config.boundary = self.boundaries.config().clone();
        self.config.background = self.background.config().clone();
        Ok(outcome)
    }

    /// Start a swirl on one element by key
    pub fn swirl(&mut self, key: &ElementKey) -> Result<Option<SwirlId>> {
        self.swirls
            .start(key, &self.layout, &self.camera, &Default::default())
    }

    /// Reset every element, drop particles and swirls. Later frames do nothing.
    pub fn shutdown(&mut self, sink: &mut dyn TransformSink) {
        if !self.running {
            return;
        }
        self.follow.clear(sink);
        self.swirls.clear();
        self.swirls.apply_to(sink);
        self.particles.clear();
        self.particles.pack_instances();
        for system in &mut self.systems {
            log::debug!("Shutting down system '{}'", system.name());
            system.shutdown();
        }
        self.hovered.clear();
        self.pointer.clear();
        self.running = false;
        log::info!("Scene shut down after {} frames", self.frames);
    }

    /// Run an extra system every frame, after the built-in engines
    pub fn add_system(&mut self, system: Box<dyn FrameSystem>) {
        log::debug!("Added system '{}'", system.name());
        self.systems.push(system);
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        self.pointer.handle(event);
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerState {
        &mut self.pointer
    }

    pub fn firefly_instances(&self) -> &[FireflyInstance] {
        self.particles.instance_data()
    }

    pub fn firefly_uniforms(&self) -> FireflyUniforms {
        self.particles.uniforms()
    }

    pub fn swirl_instances(&mut self) -> &[SwirlInstance] {
        self.swirls.pack_instances()
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            frames: self.frames,
            elapsed: self.elapsed,
            particles: self.particles.stats(),
            boundaries: self.boundaries.len(),
            follow_elements: self.follow.len(),
            active_swirls: self.swirls.active_count(),
            swirl_particles: self.swirls.particle_count(),
            tree_branches: self.tree.branches().len(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn boundaries(&self) -> &BoundaryIndex {
        &self.boundaries
    }

    pub fn particles(&self) -> &ParticleEngine {
        &self.particles
    }

    pub fn follow(&self) -> &TextFollowEngine {
        &self.follow
    }

    pub fn follow_mut(&mut self) -> &mut TextFollowEngine {
        &mut self.follow
    }

    pub fn swirls(&self) -> &SwirlEngine {
        &self.swirls
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Screen-space pointer, if any
    pub fn pointer_screen(&self) -> Option<Vec2> {
        self.pointer.screen()
    }
}
