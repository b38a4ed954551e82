//! Firefly Runtime - Frame loop glue for the firefly scene
//!
//! - `Scene` owns the tree, boundary index, particles, follow and swirl
//!   engines and the background, and runs them in a fixed order each frame
//! - `SceneConfig` / `ScenePatch` load and route configuration
//! - `FrameClock` turns wall-clock time into clamped frame deltas
//! - `PointerState` tracks mouse and touch input
//! - `FrameSystem` lets callers hook extra per-frame work

pub mod background;
pub mod clock;
pub mod config;
pub mod pointer;
pub mod scene;
pub mod system;

pub use background::{Background, BackgroundConfig, BackgroundPatch, LayerConfig, LayerState};
pub use clock::FrameClock;
pub use config::{InteractionConfig, SceneConfig, ScenePatch, SwirlTrigger, TriggerEvent};
pub use pointer::{PointerEvent, PointerState};
pub use scene::{PatchOutcome, Scene, SceneStats};
pub use system::FrameSystem;

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_core::{LayoutNode, LayoutSnapshot, RecordingSink, ScreenRect, Viewport};

    fn page() -> LayoutSnapshot {
        LayoutSnapshot::new(Viewport::new(1280.0, 720.0))
            .with_node(LayoutNode::new("venue", ScreenRect::new(440.0, 80.0, 400.0, 80.0)).with_class("venue-name"))
            .with_node(LayoutNode::new("band-a", ScreenRect::new(500.0, 300.0, 280.0, 50.0)).with_class("band-name"))
            .with_node(LayoutNode::new("tagline", ScreenRect::new(490.0, 600.0, 300.0, 30.0)).with_class("tagline"))
    }

    #[test]
    fn test_seeded_scenes_are_reproducible() {
        let config = SceneConfig {
            seed: Some(2024),
            ..Default::default()
        };
        let layout = page();
        let mut a = Scene::new(config.clone(), &layout).unwrap();
        let mut b = Scene::new(config, &layout).unwrap();
        let mut sink_a = RecordingSink::new();
        let mut sink_b = RecordingSink::new();

        for i in 0..120 {
            let x = 300.0 + i as f32 * 5.0;
            a.handle_pointer(&PointerEvent::Move { x, y: 360.0 });
            b.handle_pointer(&PointerEvent::Move { x, y: 360.0 });
            a.frame(1.0 / 60.0, &layout, &mut sink_a);
            b.frame(1.0 / 60.0, &layout, &mut sink_b);
        }

        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.firefly_instances(), b.firefly_instances());
        assert_eq!(
            sink_a.transform(&"band-a".into()),
            sink_b.transform(&"band-a".into())
        );
    }

    #[test]
    fn test_clock_driven_frames() {
        let config = SceneConfig {
            seed: Some(5),
            ..Default::default()
        };
        let layout = page();
        let mut scene = Scene::new(config, &layout).unwrap();
        let mut sink = RecordingSink::new();
        let mut clock = FrameClock::new();

        // A stalled tab produces one clamped frame, not a jump
        let dt = clock.advance(5.0);
        scene.frame(dt, &layout, &mut sink);
        assert!((scene.stats().elapsed - 0.25).abs() < 1e-6);

        let stats = scene.stats().particles;
        assert_eq!(stats.count, 200);
        assert!(stats.min_intensity >= firefly_particles::MIN_INTENSITY - 1e-4);
        assert!(stats.max_intensity <= firefly_particles::MAX_INTENSITY + 1e-4);
    }

    #[test]
    fn test_pointer_leave_releases_text() {
        let config = SceneConfig {
            seed: Some(9),
            interaction: InteractionConfig {
                swirl_triggers: Vec::new(),
                auto_swirl_interval: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let layout = page();
        let mut scene = Scene::new(config, &layout).unwrap();
        let mut sink = RecordingSink::new();

        scene.handle_pointer(&PointerEvent::Move { x: 700.0, y: 325.0 });
        for _ in 0..60 {
            scene.frame(1.0 / 60.0, &layout, &mut sink);
        }
        let pulled = sink.transform(&"band-a".into()).unwrap().translate;
        assert!(pulled.x > 1.0);

        scene.handle_pointer(&PointerEvent::Leave);
        for _ in 0..600 {
            scene.frame(1.0 / 60.0, &layout, &mut sink);
        }
        let settled = sink.transform(&"band-a".into()).unwrap().translate;
        assert!(settled.x.abs() < 1.0 && settled.y.abs() < 1.0);
    }
}
