//! Firefly Tree - Procedural branching tree
//!
//! Generates a recursive branch hierarchy from a seeded random source and
//! exposes the spawn anchors and bounds the particle engine places
//! fireflies around. Outputs plain geometry descriptors; meshing is left to
//! whichever renderer consumes them.

pub mod config;
pub mod tree;

pub use config::TreeConfig;
pub use tree::{Branch, Tree, TrunkDescriptor};

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_core::SceneRng;

    #[test]
    fn test_default_tree_terminates_with_anchors() {
        let config = TreeConfig {
            trunk_height: 80.0,
            trunk_radius: 8.0,
            depth: 3,
            ..Default::default()
        };
        for seed in 0..32 {
            let tree = Tree::generate(&config, &mut SceneRng::seeded(seed)).unwrap();
            assert!(!tree.spawn_points().is_empty());
            assert!(!tree.branches().is_empty());
            // One trunk descriptor, independent of the branch list
            assert!((tree.trunk().height - 80.0).abs() < 1e-5);
            // 1 + at most 4 + at most 16 branches for depth 3
            assert!(tree.branches().len() <= 21);
        }
    }

    #[test]
    fn test_zero_depth_is_a_bare_trunk() {
        let config = TreeConfig {
            depth: 0,
            ..Default::default()
        };
        let tree = Tree::generate(&config, &mut SceneRng::seeded(1)).unwrap();
        assert!(tree.branches().is_empty());
        assert!(tree.spawn_points().is_empty());
        assert!(!tree.bounding_box().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TreeConfig {
            branching_factor: 0.0,
            ..Default::default()
        };
        assert!(Tree::generate(&config, &mut SceneRng::seeded(1)).is_err());
    }
}
