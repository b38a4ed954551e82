//! Boundary set and spatial queries

use crate::config::BoundaryConfig;
use firefly_core::{Camera, ElementKey, LayoutSnapshot, Result, Selector, Vec2, Vec3};
use std::collections::HashSet;
use std::f32::consts::TAU;

/// Attempts `find_safe_position` makes before falling back to repulsion
pub const DEFAULT_SAFE_ATTEMPTS: u32 = 10;

/// Strength of the repulsion push used when every ring sample is blocked
const FALLBACK_PUSH: f32 = 150.0;

/// A padded UI element rectangle on the z=0 world plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    pub min: Vec2,
    pub max: Vec2,
}

impl Boundary {
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new((self.max.x - self.min.x) * 0.5, (self.max.y - self.min.y) * 0.5)
    }

    /// Inclusive on every edge; Z is ignored
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// World-space index of the UI regions particles should avoid.
///
/// The set is only as fresh as the last `refresh`: callers re-run it on
/// resize or whenever they know the layout changed.
#[derive(Clone, Debug)]
pub struct BoundaryIndex {
    config: BoundaryConfig,
    selectors: Vec<Selector>,
    boundaries: Vec<Boundary>,
}

impl BoundaryIndex {
    pub fn new(config: BoundaryConfig) -> Result<Self> {
        config.validate()?;
        let selectors = config.parsed_selectors()?;
        Ok(Self {
            config,
            selectors,
            boundaries: Vec::new(),
        })
    }

    /// An index over a fixed set of world rectangles, bypassing the layout
    pub fn from_boundaries(config: BoundaryConfig, boundaries: Vec<Boundary>) -> Result<Self> {
        let mut index = Self::new(config)?;
        index.boundaries = boundaries;
        Ok(index)
    }

    /// Rebuild every boundary from the layout snapshot. Returns the count.
    pub fn refresh(&mut self, layout: &LayoutSnapshot, camera: &Camera) -> usize {
        let mut seen: HashSet<&ElementKey> = HashSet::new();
        let mut boundaries = Vec::new();

        for selector in &self.selectors {
            for node in layout.select(selector) {
                if !node.rect.is_visible() || !seen.insert(&node.key) {
                    continue;
                }
                let padded = node.rect.padded(self.config.padding);
                let top_left = camera.screen_to_plane(padded.left, padded.top);
                let bottom_right = camera.screen_to_plane(padded.right(), padded.bottom());
                match (top_left, bottom_right) {
                    (Some(a), Some(b)) => {
                        boundaries.push(Boundary::from_corners(a.truncate(), b.truncate()));
                    }
                    _ => log::warn!("Boundary for '{}' does not reach the z=0 plane", node.key),
                }
            }
        }

        self.boundaries = boundaries;
        log::debug!(
            "Refreshed UI boundaries: {} (padding {}px)",
            self.boundaries.len(),
            self.config.padding
        );
        self.boundaries.len()
    }

    /// Change the padding and rebuild from the given layout
    pub fn set_padding(&mut self, padding: f32, layout: &LayoutSnapshot, camera: &Camera) -> usize {
        self.config.padding = padding.max(0.0);
        self.refresh(layout, camera)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.boundaries.iter().any(|b| b.contains(point))
    }

    /// Sum of the outward pushes from every boundary whose influence zone
    /// holds `point`. The push fades linearly from `strength` at a center to
    /// zero at the zone edge. Only X and Y are ever non-zero.
    pub fn repulsion_force(&self, point: Vec3, strength: f32) -> Vec3 {
        let mut force = Vec3::ZERO;

        for boundary in &self.boundaries {
            let center = boundary.center();
            let half = boundary.half_extents();
            let dx = point.x - center.x;
            let dy = point.y - center.y;

            let reach_x = half.x * self.config.influence_factor;
            let reach_y = half.y * self.config.influence_factor;
            if reach_x <= 0.0 || reach_y <= 0.0 || dx.abs() >= reach_x || dy.abs() >= reach_y {
                continue;
            }

            let normalized = (dx.abs() / reach_x).max(dy.abs() / reach_y);
            let push = (1.0 - normalized) * strength;

            let dir = Vec2::new(dx, dy);
            if dir.length() > 0.0 {
                let dir = dir.normalized();
                force.x += dir.x * push;
                force.y += dir.y * push;
            }
        }

        force
    }

    /// Nearest point outside every boundary found by probing rings around
    /// `point`; best effort, the fallback may still be inside.
    pub fn find_safe_position(&self, point: Vec3, max_attempts: u32) -> Vec3 {
        if !self.contains(point) {
            return point;
        }

        for i in 0..max_attempts {
            let angle = i as f32 / max_attempts as f32 * TAU;
            let distance = 100.0 + 20.0 * i as f32;
            let candidate = Vec3::new(
                point.x + angle.cos() * distance,
                point.y + angle.sin() * distance,
                point.z,
            );
            if !self.contains(candidate) {
                return candidate;
            }
        }

        point + self.repulsion_force(point, FALLBACK_PUSH)
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn clear(&mut self) {
        self.boundaries.clear();
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }
}
