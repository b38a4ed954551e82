//! Output seam for element transforms
//!
//! Engines compute per-element transforms; a `TransformSink` writes them to
//! whatever presentation layer is attached. `RecordingSink` is the headless
//! implementation used by the CLI and the tests.

use crate::layout::ElementKey;
use crate::types::Vec3;
use std::collections::BTreeMap;

/// Displacement, rotation and scale applied to one UI element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementTransform {
    /// Pixel offset on X/Y, depth offset on Z
    pub translate: Vec3,
    /// Radians, about the screen normal
    pub rotation: f32,
    pub scale: f32,
}

impl ElementTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec3::ZERO,
        rotation: 0.0,
        scale: 1.0,
    };

    pub fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        Self {
            translate: Vec3::new(dx, dy, dz),
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Receives per-element transform writes
pub trait TransformSink {
    fn apply(&mut self, key: &ElementKey, transform: &ElementTransform);

    /// Clear any transform previously applied to `key`
    fn reset(&mut self, key: &ElementKey);

    fn set_opacity(&mut self, key: &ElementKey, opacity: f32);
}

/// Keeps the latest write per element in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    transforms: BTreeMap<ElementKey, ElementTransform>,
    opacity: BTreeMap<ElementKey, f32>,
    writes: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self, key: &ElementKey) -> Option<&ElementTransform> {
        self.transforms.get(key)
    }

    pub fn opacity(&self, key: &ElementKey) -> Option<f32> {
        self.opacity.get(key).copied()
    }

    pub fn transforms(&self) -> impl Iterator<Item = (&ElementKey, &ElementTransform)> {
        self.transforms.iter()
    }

    /// Total number of apply/reset/opacity calls seen
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TransformSink for RecordingSink {
    fn apply(&mut self, key: &ElementKey, transform: &ElementTransform) {
        self.writes += 1;
        self.transforms.insert(key.clone(), *transform);
    }

    fn reset(&mut self, key: &ElementKey) {
        self.writes += 1;
        self.transforms.remove(key);
        self.opacity.remove(key);
    }

    fn set_opacity(&mut self, key: &ElementKey, opacity: f32) {
        self.writes += 1;
        self.opacity.insert(key.clone(), opacity.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_latest() {
        let key = ElementKey::new("title");
        let mut sink = RecordingSink::new();
        sink.apply(&key, &ElementTransform::translation(1.0, 2.0, 0.0));
        sink.apply(&key, &ElementTransform::translation(3.0, 4.0, 0.0));
        assert_eq!(sink.transform(&key).unwrap().translate, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(sink.writes(), 2);

        sink.set_opacity(&key, 1.5);
        assert_eq!(sink.opacity(&key), Some(1.0));

        sink.reset(&key);
        assert!(sink.transform(&key).is_none());
        assert!(sink.opacity(&key).is_none());
    }

    #[test]
    fn test_identity() {
        assert!(ElementTransform::default().is_identity());
        assert!(!ElementTransform::translation(0.0, 1.0, 0.0).is_identity());
    }
}
