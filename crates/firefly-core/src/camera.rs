//! Perspective camera used to map screen pixels onto the z=0 scene plane

use crate::layout::Viewport;
use crate::types::{Vec2, Vec3};
use glam::{Mat4, Vec4Swizzles};
use serde::{Deserialize, Serialize};

/// Camera parameters, parsed from the `[camera]` config table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 400.0),
            target: Vec3::ZERO,
        }
    }
}

/// A perspective camera looking at the scene plane
#[derive(Debug, Clone)]
pub struct Camera {
    pub config: CameraConfig,
    viewport: Viewport,
}

impl Camera {
    pub fn new(config: CameraConfig, viewport: Viewport) -> Self {
        Self { config, viewport }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update the viewport (and with it the aspect ratio)
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.aspect()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            self.config.position.into(),
            self.config.target.into(),
            glam::Vec3::Y,
        )
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.config.fov.to_radians(),
            self.aspect(),
            self.config.near,
            self.config.far,
        )
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Inverse of the combined view-projection matrix (for unprojecting)
    pub fn inverse_view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix().inverse()
    }

    /// Convert a pixel coordinate to normalized device coordinates (-1..1, +Y up)
    pub fn screen_to_ndc(&self, sx: f32, sy: f32) -> Vec2 {
        let w = self.viewport.width.max(1.0);
        let h = self.viewport.height.max(1.0);
        Vec2::new((sx / w) * 2.0 - 1.0, -(sy / h) * 2.0 + 1.0)
    }

    /// World-space ray through a pixel. Returns (origin, normalized direction).
    pub fn screen_ray(&self, sx: f32, sy: f32) -> (Vec3, Vec3) {
        let ndc = self.screen_to_ndc(sx, sy);
        let inv = self.inverse_view_projection_matrix();
        let on_plane = inv.project_point3(glam::Vec3::new(ndc.x, ndc.y, 0.0));
        let origin: glam::Vec3 = self.config.position.into();
        let dir = (on_plane - origin).normalize_or_zero();
        (origin.into(), dir.into())
    }

    /// Project a pixel onto the z=0 plane the particles live on.
    /// Returns None when the ray runs parallel to the plane.
    pub fn screen_to_plane(&self, sx: f32, sy: f32) -> Option<Vec3> {
        let (origin, dir) = self.screen_ray(sx, sy);
        if dir.z.abs() < 1e-6 {
            return None;
        }
        let t = -origin.z / dir.z;
        Some(origin + dir * t)
    }

    /// Project a world-space point to pixel coordinates.
    /// Returns None if the point is behind the camera.
    pub fn world_to_screen(&self, p: Vec3) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * glam::Vec4::new(p.x, p.y, p.z, 1.0);
        if clip.w <= 0.001 {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.width,
            (1.0 - ndc.y) * 0.5 * self.viewport.height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(CameraConfig::default(), Viewport::new(1920.0, 1080.0))
    }

    #[test]
    fn test_screen_center_hits_origin() {
        let cam = camera();
        let p = cam.screen_to_plane(960.0, 540.0).unwrap();
        assert!(p.x.abs() < 1e-2);
        assert!(p.y.abs() < 1e-2);
        assert!(p.z.abs() < 1e-3);
    }

    #[test]
    fn test_screen_axes_map_to_world_axes() {
        let cam = camera();
        let right = cam.screen_to_plane(1920.0, 540.0).unwrap();
        let top = cam.screen_to_plane(960.0, 0.0).unwrap();
        assert!(right.x > 0.0);
        assert!(top.y > 0.0);

        // Half the visible height at distance 400 with a 75 degree fov
        let expected = 400.0 * (75.0f32.to_radians() / 2.0).tan();
        assert!((top.y - expected).abs() < 0.5);
    }

    #[test]
    fn test_project_roundtrip_on_plane() {
        let cam = camera();
        let world = cam.screen_to_plane(300.0, 200.0).unwrap();
        let screen = cam.world_to_screen(world).unwrap();
        assert!((screen.x - 300.0).abs() < 0.1);
        assert!((screen.y - 200.0).abs() < 0.1);
    }

    #[test]
    fn test_ndc_corners() {
        let cam = camera();
        let tl = cam.screen_to_ndc(0.0, 0.0);
        assert_eq!(tl, Vec2::new(-1.0, 1.0));
        let br = cam.screen_to_ndc(1920.0, 1080.0);
        assert_eq!(br, Vec2::new(1.0, -1.0));
    }
}
