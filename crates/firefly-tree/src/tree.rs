//! Recursive branch generation and sway animation

use crate::config::TreeConfig;
use firefly_core::{Aabb, Result, SceneRng, Vec3};
use glam::Quat;

/// Cylinder descriptor for the trunk
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrunkDescriptor {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    /// Cylinder center in tree-local space
    pub center: Vec3,
}

/// One generated branch, in tree-local space
#[derive(Clone, Debug)]
pub struct Branch {
    pub start: Vec3,
    /// Unit growth direction
    pub direction: Vec3,
    pub length: f32,
    /// Radius at the base; the tip is 0.6× this
    pub radius: f32,
    /// Levels remaining below this branch (1 = leaf level)
    pub depth: u32,
    /// Orientation mapping +Y onto `direction`
    pub rest_orientation: Quat,
    /// Current sway about the local X and Z axes, radians
    pub sway_x: f32,
    pub sway_z: f32,
}

impl Branch {
    pub fn end(&self) -> Vec3 {
        self.start + self.direction * self.length
    }

    pub fn midpoint(&self) -> Vec3 {
        self.start + self.direction * (self.length * 0.5)
    }

    pub fn radius_top(&self) -> f32 {
        self.radius * 0.6
    }

    /// Rest orientation with the current sway applied on top
    pub fn orientation(&self) -> Quat {
        self.rest_orientation * Quat::from_rotation_x(self.sway_x) * Quat::from_rotation_z(self.sway_z)
    }
}

/// A generated tree: trunk, branches and particle spawn anchors
#[derive(Clone, Debug)]
pub struct Tree {
    config: TreeConfig,
    trunk: TrunkDescriptor,
    branches: Vec<Branch>,
    /// Tree-local anchors; see `spawn_points` for world space
    local_spawn_points: Vec<Vec3>,
    time: f32,
    /// Whole-tree sway about Z
    rotation_z: f32,
}

impl Tree {
    /// Build a tree. Fails only if the config does not validate.
    pub fn generate(config: &TreeConfig, rng: &mut SceneRng) -> Result<Self> {
        config.validate()?;

        let trunk = TrunkDescriptor {
            radius_top: config.trunk_radius * 0.8,
            radius_bottom: config.trunk_radius,
            height: config.trunk_height,
            center: Vec3::new(0.0, config.trunk_height / 2.0, 0.0),
        };

        let mut tree = Self {
            config: config.clone(),
            trunk,
            branches: Vec::new(),
            local_spawn_points: Vec::new(),
            time: 0.0,
            rotation_z: 0.0,
        };

        tree.grow(
            rng,
            Vec3::new(0.0, config.trunk_height, 0.0),
            Vec3::UP,
            config.trunk_radius * config.branching_factor,
            config.trunk_height * 0.4,
            config.depth,
            config.angle_variation,
        );

        log::debug!(
            "Generated tree: {} branches, {} spawn points",
            tree.branches.len(),
            tree.local_spawn_points.len()
        );
        Ok(tree)
    }

    #[allow(clippy::too_many_arguments)]
    fn grow(
        &mut self,
        rng: &mut SceneRng,
        start: Vec3,
        direction: Vec3,
        radius: f32,
        length: f32,
        depth: u32,
        angle_variation: f32,
    ) {
        if depth == 0 || radius < self.config.min_radius {
            return;
        }

        let branch = Branch {
            start,
            direction,
            length,
            radius,
            depth,
            rest_orientation: Quat::from_rotation_arc(glam::Vec3::Y, direction.into()),
            sway_x: 0.0,
            sway_z: 0.0,
        };
        let end = branch.end();
        self.branches.push(branch);

        let anchors = rng.range_inclusive(1, 3);
        for i in 0..anchors {
            let t = (i + 1) as f32 / (anchors + 1) as f32;
            self.local_spawn_points.push(start.lerp(end, t));
        }

        // Inner levels fork 2-4 ways, the outermost level 3-6
        let children = if depth > 1 {
            rng.range_inclusive(2, 4)
        } else {
            rng.range_inclusive(3, 6)
        }
        .min(self.config.max_children);

        for _ in 0..children {
            let angle_x = rng.signed(angle_variation);
            let angle_z = rng.signed(angle_variation);
            let rotated = Quat::from_rotation_z(angle_z) * Quat::from_rotation_x(angle_x) * glam::Vec3::from(direction);
            let child_dir = Vec3::from(rotated).normalized();

            let child_length = length * rng.range(0.6, 0.9);
            self.grow(
                rng,
                end,
                child_dir,
                radius * self.config.branching_factor,
                child_length,
                depth - 1,
                angle_variation * 1.2,
            );
        }
    }

    /// Advance the sway animation. Outer (low-depth) branches sway more.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        let t = self.time;
        let levels = (self.config.depth + 1) as f32;

        for (index, branch) in self.branches.iter_mut().enumerate() {
            let i = index as f32;
            let intensity = self.config.sway_amount * (levels - branch.depth as f32) * 0.3;
            branch.sway_x = (t * 0.5 + i * 0.1).sin() * intensity;
            branch.sway_z = (t * 0.7 + i * 0.15).cos() * intensity * 0.7;
        }

        self.rotation_z = (t * 0.3).sin() * 0.01;
    }

    /// Tree-local point to world space (tree position + whole-tree sway)
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        let rotated = Quat::from_rotation_z(self.rotation_z) * glam::Vec3::from(local);
        Vec3::from(rotated) + self.config.position
    }

    /// Spawn anchors in world space at the current sway
    pub fn spawn_points(&self) -> Vec<Vec3> {
        self.local_spawn_points
            .iter()
            .map(|&p| self.to_world(p))
            .collect()
    }

    pub fn local_spawn_points(&self) -> &[Vec3] {
        &self.local_spawn_points
    }

    /// World-space bounds of the trunk and every branch in their rest pose.
    ///
    /// Whole-tree sway is applied; per-branch sway is not, matching
    /// `spawn_points`. Branch sway stays under 0.02 rad.
    pub fn bounding_box(&self) -> Aabb {
        let mut local = Aabb::EMPTY;
        let r = self.trunk.radius_bottom;
        local.extend(Vec3::new(-r, 0.0, -r));
        local.extend(Vec3::new(r, self.trunk.height, r));
        for branch in &self.branches {
            local.extend_sphere(branch.start, branch.radius);
            local.extend_sphere(branch.end(), branch.radius_top());
        }

        let mut world = Aabb::EMPTY;
        for corner in corners(&local) {
            world.extend(self.to_world(corner));
        }
        world
    }

    pub fn trunk(&self) -> &TrunkDescriptor {
        &self.trunk
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn rotation_z(&self) -> f32 {
        self.rotation_z
    }
}

fn corners(aabb: &Aabb) -> [Vec3; 8] {
    let (a, b) = (aabb.min, aabb.max);
    [
        Vec3::new(a.x, a.y, a.z),
        Vec3::new(b.x, a.y, a.z),
        Vec3::new(a.x, b.y, a.z),
        Vec3::new(b.x, b.y, a.z),
        Vec3::new(a.x, a.y, b.z),
        Vec3::new(b.x, a.y, b.z),
        Vec3::new(a.x, b.y, b.z),
        Vec3::new(b.x, b.y, b.z),
    ]
}
