//! Frame system trait

use firefly_tree::Tree;

/// Something the scene advances once per frame, after the core engines
pub trait FrameSystem {
    fn update(&mut self, dt: f32);

    /// Called once when the scene shuts down
    fn shutdown(&mut self) {}

    /// Human-readable name for this system
    fn name(&self) -> &str;
}

impl FrameSystem for Tree {
    fn update(&mut self, dt: f32) {
        Tree::update(self, dt);
    }

    fn name(&self) -> &str {
        "tree"
    }
}
