//! Per-particle state machine

use firefly_boundary::BoundaryIndex;
use firefly_core::{Color, SceneRng, Vec3};
use std::f32::consts::{PI, TAU};

/// Half-extent of the wrap volume on X and Y
pub const WRAP_XY: f32 = 500.0;
/// Half-extent of the wrap volume on Z
pub const WRAP_Z: f32 = 250.0;

pub const MIN_INTENSITY: f32 = 0.1;
pub const MAX_INTENSITY: f32 = 2.5;

/// Seconds of strobe at the start of a burst
const BURST_STROBE: f32 = 0.2;
/// Seconds from burst start to the end of the fade
const BURST_END: f32 = 0.5;
const BURST_PEAK: f32 = 2.0;

const BURST_CHANCE: f32 = 0.004;
const DIM_CHANCE: f32 = 0.008;
const IMPULSE_CHANCE: f32 = 0.01;
const DAMPING: f32 = 0.98;

/// Per-frame displacement is velocity × dt × this
const FRAME_RATE: f32 = 60.0;

/// Appearance and motion parameters fixed when a particle is created
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireflyParams {
    pub scale: f32,
    pub blink_offset: f32,
    pub blink_speed: f32,
    pub float_speed: f32,
    pub float_radius: f32,
    /// Weight of the tangential swirl around the pointer
    pub curiosity: f32,
    pub color: Color,
    /// Fixed mesh rotation, radians per axis
    pub rotation: Vec3,
}

impl FireflyParams {
    pub fn random(rng: &mut SceneRng) -> Self {
        Self {
            scale: rng.range(0.5, 1.0),
            blink_offset: rng.angle(),
            blink_speed: rng.range(0.5, 1.0),
            float_speed: rng.range(0.2, 0.5),
            float_radius: rng.range(10.0, 30.0),
            curiosity: rng.range(0.3, 1.0),
            color: Color::from_hsl(0.11 + rng.range(0.0, 0.05), 0.8, 0.5),
            rotation: Vec3::new(rng.range(0.0, PI), rng.range(0.0, PI), rng.range(0.0, PI)),
        }
    }
}

impl Default for FireflyParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            blink_offset: 0.0,
            blink_speed: 1.0,
            float_speed: 0.5,
            float_radius: 15.0,
            curiosity: 0.5,
            color: Color::from_hsl(0.13, 0.8, 0.5),
            rotation: Vec3::ZERO,
        }
    }
}

/// Blink sub-state
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlinkMode {
    Blinking,
    /// `timer` counts seconds since the burst began
    Bursting { timer: f32 },
}

/// Pointer parameters shared by every particle for one tick
#[derive(Clone, Copy, Debug)]
pub struct PointerForce {
    /// World position on the z=0 plane
    pub position: Vec3,
    pub radius: f32,
    pub force: f32,
}

#[derive(Clone, Debug)]
pub struct Firefly {
    pub index: usize,
    pub params: FireflyParams,
    position: Vec3,
    velocity: Vec3,
    time: f32,
    blink_intensity: f32,
    target_intensity: f32,
    is_blinking: bool,
    mode: BlinkMode,
    /// Set when the particle steers around UI boundaries
    avoidance_strength: Option<f32>,
}

impl Firefly {
    pub fn new(index: usize, position: Vec3, params: FireflyParams, rng: &mut SceneRng) -> Self {
        Self {
            index,
            params,
            position,
            velocity: Vec3::new(rng.signed(0.25), rng.signed(0.25), rng.signed(0.25)),
            time: rng.angle(),
            blink_intensity: 1.0,
            target_intensity: 1.0,
            is_blinking: true,
            mode: BlinkMode::Blinking,
            avoidance_strength: None,
        }
    }

    /// Steer away from UI boundaries with the given strength on every update
    pub fn bind_avoidance(&mut self, strength: f32) {
        self.avoidance_strength = Some(strength);
    }

    pub fn unbind_avoidance(&mut self) {
        self.avoidance_strength = None;
    }

    /// Advance one tick
    pub fn update(
        &mut self,
        dt: f32,
        rng: &mut SceneRng,
        pointer: Option<&PointerForce>,
        boundaries: Option<&BoundaryIndex>,
    ) {
        self.time += dt;

        self.update_floating(dt, rng);
        self.update_blinking(dt, rng);
        if let Some(pointer) = pointer {
            self.update_pointer(pointer, rng);
        }
        if let (Some(strength), Some(index)) = (self.avoidance_strength, boundaries) {
            self.velocity += index.repulsion_force(self.position, strength);
        }

        self.position += self.velocity * (dt * FRAME_RATE);
        self.position = wrap_position(self.position);
    }

    fn update_floating(&mut self, dt: f32, rng: &mut SceneRng) {
        let p = &self.params;
        let target = Vec3::new(
            (self.time * p.float_speed).sin() * p.float_radius,
            (self.time * p.float_speed * 1.3).sin() * p.float_radius * 0.7,
            (self.time * p.float_speed * 0.7).sin() * p.float_radius * 0.5,
        );
        self.velocity += (target - self.velocity) * (dt * 0.5);

        if rng.chance(IMPULSE_CHANCE) {
            self.velocity += Vec3::new(rng.signed(1.0), rng.signed(1.0), rng.signed(1.0));
        }

        self.velocity *= DAMPING;
    }

    /// Baseline blink level in [0, 1]
    pub fn base_intensity(&self) -> f32 {
        (self.time * self.params.blink_speed + self.params.blink_offset).sin() * 0.5 + 0.5
    }

    fn update_blinking(&mut self, dt: f32, rng: &mut SceneRng) {
        if self.is_blinking {
            let base = self.base_intensity();

            match self.mode {
                BlinkMode::Blinking if rng.chance(BURST_CHANCE) => {
                    self.mode = BlinkMode::Bursting { timer: 0.0 };
                    self.target_intensity = BURST_PEAK;
                }
                BlinkMode::Bursting { timer } => {
                    let timer = timer + dt;
                    if timer < BURST_STROBE {
                        self.target_intensity = BURST_PEAK + (timer * 50.0).sin() * 0.5;
                        self.mode = BlinkMode::Bursting { timer };
                    } else if timer < BURST_END {
                        let fade = (timer - BURST_STROBE) / (BURST_END - BURST_STROBE);
                        self.target_intensity = BURST_PEAK * (1.0 - fade);
                        self.mode = BlinkMode::Bursting { timer };
                    } else {
                        self.mode = BlinkMode::Blinking;
                        self.target_intensity = base;
                    }
                }
                BlinkMode::Blinking if rng.chance(DIM_CHANCE) => {
                    self.target_intensity = MIN_INTENSITY;
                }
                BlinkMode::Blinking => {
                    self.target_intensity = base * rng.range(0.8, 1.2);
                }
            }

            let speed = if self.is_bursting() { 15.0 } else { 5.0 };
            self.blink_intensity += (self.target_intensity - self.blink_intensity) * dt * speed;
        }

        self.blink_intensity = self.blink_intensity.clamp(MIN_INTENSITY, MAX_INTENSITY);
    }

    fn update_pointer(&mut self, pointer: &PointerForce, rng: &mut SceneRng) {
        // A pointer parked exactly on the origin means "no pointer"
        if pointer.position.is_zero() {
            return;
        }

        let offset = self.position - pointer.position;
        let distance = offset.length();
        if distance >= pointer.radius {
            return;
        }

        let falloff = 1.0 - distance / pointer.radius;
        let direction = offset.normalized();
        let tangent = Vec3::new(-direction.y, direction.x, 0.0).normalized();

        self.velocity += direction * (falloff * pointer.force * 0.5);
        self.velocity += tangent * (falloff * pointer.force * self.params.curiosity);

        self.blink_intensity = (self.blink_intensity + falloff).min(MAX_INTENSITY);

        if !self.is_bursting() && rng.chance(falloff * 0.02) {
            self.mode = BlinkMode::Bursting { timer: 0.0 };
        }
    }

    /// Enter a burst now, as if triggered stochastically
    pub fn trigger_burst(&mut self) {
        self.mode = BlinkMode::Bursting { timer: 0.0 };
        self.target_intensity = BURST_PEAK;
    }

    pub fn set_blinking(&mut self, blinking: bool) {
        self.is_blinking = blinking;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = wrap_position(position);
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn intensity(&self) -> f32 {
        self.blink_intensity
    }

    pub fn target_intensity(&self) -> f32 {
        self.target_intensity
    }

    pub fn color(&self) -> Color {
        self.params.color
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn mode(&self) -> BlinkMode {
        self.mode
    }

    pub fn is_blinking(&self) -> bool {
        self.is_blinking
    }

    pub fn is_bursting(&self) -> bool {
        matches!(self.mode, BlinkMode::Bursting { .. })
    }

    pub fn avoidance_strength(&self) -> Option<f32> {
        self.avoidance_strength
    }
}

/// Wrap each axis independently: leaving past +bound re-enters at -bound
/// and vice versa.
pub fn wrap_position(mut p: Vec3) -> Vec3 {
    p.x = wrap_axis(p.x, WRAP_XY);
    p.y = wrap_axis(p.y, WRAP_XY);
    p.z = wrap_axis(p.z, WRAP_Z);
    p
}

fn wrap_axis(v: f32, bound: f32) -> f32 {
    if v > bound {
        -bound
    } else if v < -bound {
        bound
    } else {
        v
    }
}

/// Phase offset in [0, 2π) for a value that may have drifted past it
pub(crate) fn phase(v: f32) -> f32 {
    v.rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firefly(seed: u64) -> (Firefly, SceneRng) {
        let mut rng = SceneRng::seeded(seed);
        let params = FireflyParams::random(&mut rng);
        (Firefly::new(0, Vec3::ZERO, params, &mut rng), rng)
    }

    #[test]
    fn test_random_params_in_range() {
        let mut rng = SceneRng::seeded(11);
        for _ in 0..200 {
            let p = FireflyParams::random(&mut rng);
            assert!((0.5..1.0).contains(&p.scale));
            assert!((0.5..1.0).contains(&p.blink_speed));
            assert!((0.2..0.5).contains(&p.float_speed));
            assert!((10.0..30.0).contains(&p.float_radius));
            assert!((0.3..1.0).contains(&p.curiosity));
            assert!((0.0..TAU).contains(&p.blink_offset));
        }
    }

    #[test]
    fn test_crossing_positive_bound_teleports() {
        let wrapped = wrap_position(Vec3::new(500.5, -501.0, 250.1));
        assert_eq!(wrapped, Vec3::new(-500.0, 500.0, -250.0));

        let inside = Vec3::new(499.0, -499.0, 0.0);
        assert_eq!(wrap_position(inside), inside);
    }

    #[test]
    fn test_wrap_after_integration() {
        let (mut f, mut rng) = firefly(1);
        f.set_position(Vec3::new(499.0, 0.0, 0.0));
        f.set_velocity(Vec3::new(10.0, 0.0, 0.0));
        f.update(1.0 / 60.0, &mut rng, None, None);
        assert_eq!(f.position().x, -500.0);
    }

    #[test]
    fn test_intensity_stays_bounded_under_pointer() {
        let (mut f, mut rng) = firefly(2);
        let pointer = PointerForce {
            position: Vec3::new(5.0, 5.0, 0.0),
            radius: 200.0,
            force: 5.0,
        };
        for i in 0..2000 {
            if i % 97 == 0 {
                f.trigger_burst();
            }
            f.set_position(Vec3::new(1.0, 1.0, 0.0));
            f.update(1.0 / 30.0, &mut rng, Some(&pointer), None);
            assert!(f.intensity() >= MIN_INTENSITY && f.intensity() <= MAX_INTENSITY);
        }
    }

    #[test]
    fn test_burst_ends_within_half_second() {
        let (mut f, mut rng) = firefly(3);
        f.trigger_burst();
        assert!(f.is_bursting());

        // 0.4 s in: still fading
        f.update(0.2, &mut rng, None, None);
        f.update(0.2, &mut rng, None, None);
        assert!(f.is_bursting());

        // 0.51 s in: back to blinking
        f.update(0.11, &mut rng, None, None);
        assert!(!f.is_bursting());

        let (mut g, mut rng) = firefly(3);
        g.trigger_burst();
        for _ in 0..3 {
            g.update(0.125, &mut rng, None, None);
        }
        assert!(g.is_bursting());
        g.update(0.125, &mut rng, None, None);
        assert!(!g.is_bursting());
    }

    #[test]
    fn test_burst_strobes_then_fades() {
        let (mut f, mut rng) = firefly(4);
        f.trigger_burst();
        f.update(0.1, &mut rng, None, None);
        let strobe = f.target_intensity();
        assert!((1.5..=2.5).contains(&strobe));

        f.update(0.25, &mut rng, None, None);
        // timer = 0.35: halfway through the fade
        assert!((f.target_intensity() - 1.0).abs() < 1e-4);
        assert!(f.is_bursting());

        f.update(0.2, &mut rng, None, None);
        assert!(!f.is_bursting());
        assert!((0.0..=1.0).contains(&f.target_intensity()));
    }

    #[test]
    fn test_pointer_pushes_outward() {
        let (mut f, mut rng) = firefly(5);
        f.params.curiosity = 0.0;
        f.set_position(Vec3::new(100.0, 0.0, 0.0));
        f.set_velocity(Vec3::ZERO);
        let pointer = PointerForce {
            position: Vec3::new(50.0, 0.0, 0.0),
            radius: 200.0,
            force: 1.0,
        };
        f.update_pointer(&pointer, &mut rng);
        // falloff 0.75 * force 1 * 0.5
        assert!((f.velocity().x - 0.375).abs() < 1e-5);
        assert!(f.velocity().y.abs() < 1e-6);
    }

    #[test]
    fn test_pointer_swirls_tangentially() {
        let (mut f, mut rng) = firefly(6);
        f.params.curiosity = 1.0;
        f.set_position(Vec3::new(100.0, 0.0, 0.0));
        f.set_velocity(Vec3::ZERO);
        let pointer = PointerForce {
            position: Vec3::new(50.0, 0.0, 0.0),
            radius: 200.0,
            force: 1.0,
        };
        f.update_pointer(&pointer, &mut rng);
        assert!((f.velocity().y - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_pointer_at_origin_or_far_does_nothing() {
        let (mut f, mut rng) = firefly(7);
        f.set_position(Vec3::new(10.0, 0.0, 0.0));
        f.set_velocity(Vec3::ZERO);
        let at_origin = PointerForce {
            position: Vec3::ZERO,
            radius: 200.0,
            force: 1.0,
        };
        f.update_pointer(&at_origin, &mut rng);
        assert_eq!(f.velocity(), Vec3::ZERO);

        let far = PointerForce {
            position: Vec3::new(400.0, 0.0, 0.0),
            ..at_origin
        };
        f.update_pointer(&far, &mut rng);
        assert_eq!(f.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_pointer_on_top_of_particle_is_finite() {
        let (mut f, mut rng) = firefly(8);
        let here = Vec3::new(20.0, 20.0, 0.0);
        f.set_position(here);
        f.set_velocity(Vec3::ZERO);
        let pointer = PointerForce {
            position: here,
            radius: 200.0,
            force: 1.0,
        };
        f.update_pointer(&pointer, &mut rng);
        assert_eq!(f.velocity(), Vec3::ZERO);
        assert!(f.intensity() <= MAX_INTENSITY);
    }

    #[test]
    fn test_frozen_blink_holds_intensity() {
        let (mut f, mut rng) = firefly(9);
        f.set_blinking(false);
        for _ in 0..10 {
            f.update(1.0 / 60.0, &mut rng, None, None);
        }
        assert_eq!(f.intensity(), 1.0);
    }

    #[test]
    fn test_phase_wraps() {
        assert!((phase(TAU + 1.0) - 1.0).abs() < 1e-5);
        assert!((phase(-1.0) - (TAU - 1.0)).abs() < 1e-5);
    }
}
