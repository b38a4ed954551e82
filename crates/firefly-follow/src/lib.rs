//! Firefly Follow - Pointer-driven effects on UI text
//!
//! - `TextFollowEngine`: spring-damper model pulling registered elements
//!   (and their letters) toward the pointer, with stickiness near it and a
//!   return spring bounded by a hard displacement limit
//! - `SwirlEngine`: dissolves an element into spiralling particles that
//!   settle back onto its letters
//!
//! Both read a `LayoutSnapshot` and write through a `TransformSink`; neither
//! touches the presentation layer directly.

pub mod config;
pub mod engine;
pub mod swirl;

pub use config::{FollowConfig, FollowConfigPatch};
pub use engine::{FollowElement, FollowHandle, FollowLetter, TextFollowEngine};
pub use swirl::{SwirlConfig, SwirlConfigPatch, SwirlEngine, SwirlId, SwirlInstance, SwirlParticle, SwirlPhase};

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_core::{LayoutNode, LayoutSnapshot, RecordingSink, ScreenRect, Vec2, Viewport};

    #[test]
    fn test_pointer_on_origin_holds_within_min_distance() {
        let layout = LayoutSnapshot::new(Viewport::new(800.0, 600.0))
            .with_node(LayoutNode::new("label", ScreenRect::new(50.0, 80.0, 100.0, 40.0)));
        let mut engine = TextFollowEngine::new(FollowConfig::default()).unwrap();
        let handle = engine
            .register(&"label".into(), &layout, FollowConfigPatch::default())
            .unwrap();
        let origin = engine.get(handle).unwrap().origin();
        assert_eq!(origin, Vec2::new(100.0, 100.0));

        let pointer = Vec2::new(100.0, 100.0);
        let config = FollowConfig::default();
        for _ in 0..60 {
            engine.update(1.0 / 60.0, Some(pointer), &layout);
            let e = engine.get(handle).unwrap();
            assert!(e.current().distance(pointer) <= config.min_distance);
            assert!(e.displacement().length() <= config.max_displacement);
        }

        let mut sink = RecordingSink::new();
        engine.apply_to(&mut sink);
        let t = sink.transform(&"label".into()).unwrap();
        // Full influence: raised by 20 * z_depth and scaled up 8%
        assert!((t.translate.z - 16.0).abs() < 1e-4);
        assert!((t.scale - 1.08).abs() < 1e-5);
    }

    #[test]
    fn test_offset_pointer_converges_and_clamps() {
        let layout = LayoutSnapshot::new(Viewport::new(800.0, 600.0))
            .with_node(LayoutNode::new("label", ScreenRect::new(50.0, 80.0, 100.0, 40.0)));
        let mut engine = TextFollowEngine::new(FollowConfig::default()).unwrap();
        let handle = engine
            .register(&"label".into(), &layout, FollowConfigPatch::default())
            .unwrap();

        let pointer = Vec2::new(240.0, 100.0);
        let start = pointer.distance(Vec2::new(100.0, 100.0));
        for _ in 0..120 {
            engine.update(1.0 / 60.0, Some(pointer), &layout);
            assert!(engine.get(handle).unwrap().displacement().length() <= 150.0 + 1e-3);
        }
        let e = engine.get(handle).unwrap();
        assert!(e.current().distance(pointer) < start);
    }
}
