//! Firefly Particles - Autonomous firefly simulation
//!
//! Each firefly runs a small state machine every tick:
//! - Floating: velocity eased toward three out-of-phase sine targets, damped
//! - Blinking: sinusoidal intensity with random dims and short bursts
//! - Pointer: outward push plus tangential swirl, brightening near the cursor
//! - UI avoidance: optional repulsion from `BoundaryIndex` regions
//!
//! Positions wrap (teleport) at ±500 on X/Y and ±250 on Z.

pub mod config;
pub mod engine;
pub mod firefly;
pub mod instance;

pub use config::{EngineConfig, EngineConfigPatch};
pub use engine::{EngineStats, ParticleEngine};
pub use firefly::{BlinkMode, Firefly, FireflyParams, PointerForce, MAX_INTENSITY, MIN_INTENSITY, WRAP_XY, WRAP_Z};
pub use instance::{FireflyInstance, FireflyUniforms};

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_core::SceneRng;

    #[test]
    fn test_ten_fireflies_hundred_frames_stay_bounded() {
        let config = EngineConfig {
            firefly_count: 10,
            ..Default::default()
        };
        let mut engine = ParticleEngine::new(config, SceneRng::seeded(2024)).unwrap();
        engine.respawn(&[], None);

        for _ in 0..100 {
            engine.update(1.0 / 60.0, None, None);
            for f in engine.fireflies() {
                let p = f.position();
                assert!(p.x.abs() <= WRAP_XY);
                assert!(p.y.abs() <= WRAP_XY);
                assert!(p.z.abs() <= WRAP_Z);
                assert!(f.intensity() >= MIN_INTENSITY && f.intensity() <= MAX_INTENSITY);
            }
        }
    }

    #[test]
    fn test_same_seed_same_simulation() {
        let run = || {
            let config = EngineConfig {
                firefly_count: 25,
                ..Default::default()
            };
            let mut engine = ParticleEngine::new(config, SceneRng::seeded(77)).unwrap();
            engine.respawn(&[], None);
            for _ in 0..60 {
                engine.update(1.0 / 60.0, None, None);
            }
            engine.fireflies().iter().map(|f| f.position()).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            mouse_radius: 0.0,
            ..Default::default()
        };
        assert!(ParticleEngine::new(config, SceneRng::seeded(1)).is_err());
    }
}
