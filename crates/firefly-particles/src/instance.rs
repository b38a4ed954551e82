//! GPU instance data for fireflies

use crate::firefly::{phase, Firefly};
use bytemuck::{Pod, Zeroable};

/// Rendered radius of a scale-1 firefly
pub const BASE_SIZE: f32 = 2.5;

/// One firefly as the instanced draw call reads it.
/// 48 bytes, 3 rows of vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FireflyInstance {
    pub pos_size: [f32; 4],        // xyz = position, w = rendered size
    pub color_intensity: [f32; 4], // rgb = base color, w = blink intensity
    pub rotation_time: [f32; 4],   // xyz = mesh rotation, w = shader time
}

impl FireflyInstance {
    pub fn from_firefly(f: &Firefly, firefly_scale: f32) -> Self {
        let p = f.position();
        let c = f.color();
        let r = f.params.rotation;
        Self {
            pos_size: [p.x, p.y, p.z, f.params.scale * firefly_scale * BASE_SIZE],
            color_intensity: [c.r, c.g, c.b, f.intensity()],
            rotation_time: [r.x, r.y, r.z, phase(f.time())],
        }
    }
}

/// Per-draw shader constants shared by every firefly instance.
/// 16 bytes, one vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FireflyUniforms {
    pub glow_strength: f32,
    pub core_size: f32,
    pub time: f32,
    pub _padding: f32,
}

impl FireflyUniforms {
    pub fn new(glow_strength: f32, core_size: f32, time: f32) -> Self {
        Self {
            glow_strength,
            core_size,
            time,
            _padding: 0.0,
        }
    }
}
