//! Pointer (mouse / touch) tracking

use firefly_core::{Camera, Vec2, Vec3};

/// Raw pointer input from the presentation layer, in screen pixels
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    /// Press-and-release at a point; also moves the pointer there
    Click { x: f32, y: f32 },
    /// Active touches; only the first one steers
    Touch(Vec<Vec2>),
    Leave,
    TouchEnd,
}

/// Latest pointer position, or nothing when no pointer is interacting
#[derive(Clone, Debug, Default)]
pub struct PointerState {
    screen: Option<Vec2>,
    clicks: Vec<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: &PointerEvent) {
        match event {
            PointerEvent::Move { x, y } => self.screen = Some(Vec2::new(*x, *y)),
            PointerEvent::Click { x, y } => {
                let p = Vec2::new(*x, *y);
                self.screen = Some(p);
                self.clicks.push(p);
            }
            PointerEvent::Touch(touches) => {
                if let Some(first) = touches.first() {
                    self.screen = Some(*first);
                }
            }
            PointerEvent::Leave | PointerEvent::TouchEnd => self.screen = None,
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.handle(&PointerEvent::Move { x, y });
    }

    pub fn clear(&mut self) {
        self.screen = None;
        self.clicks.clear();
    }

    /// Clicks received since the last call, oldest first
    pub fn take_clicks(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.clicks)
    }

    pub fn screen(&self) -> Option<Vec2> {
        self.screen
    }

    /// Where the pointer ray meets the z=0 plane
    pub fn world(&self, camera: &Camera) -> Option<Vec3> {
        let s = self.screen?;
        camera.screen_to_plane(s.x, s.y)
    }

    pub fn is_active(&self) -> bool {
        self.screen.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_core::{CameraConfig, Viewport};

    #[test]
    fn test_tracks_mouse_and_touch() {
        let mut p = PointerState::new();
        assert!(!p.is_active());
        p.move_to(10.0, 20.0);
        assert_eq!(p.screen(), Some(Vec2::new(10.0, 20.0)));

        p.handle(&PointerEvent::Touch(vec![Vec2::new(5.0, 6.0), Vec2::new(7.0, 8.0)]));
        assert_eq!(p.screen(), Some(Vec2::new(5.0, 6.0)));

        // An empty touch list keeps the last position
        p.handle(&PointerEvent::Touch(Vec::new()));
        assert_eq!(p.screen(), Some(Vec2::new(5.0, 6.0)));

        p.handle(&PointerEvent::TouchEnd);
        assert!(p.screen().is_none());
    }

    #[test]
    fn test_clicks_queue_until_taken() {
        let mut p = PointerState::new();
        p.handle(&PointerEvent::Click { x: 1.0, y: 2.0 });
        p.handle(&PointerEvent::Click { x: 3.0, y: 4.0 });
        assert_eq!(p.screen(), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(p.take_clicks(), vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)]);
        assert!(p.take_clicks().is_empty());
    }

    #[test]
    fn test_world_position_on_plane() {
        let camera = Camera::new(CameraConfig::default(), Viewport::new(800.0, 600.0));
        let mut p = PointerState::new();
        assert!(p.world(&camera).is_none());

        p.move_to(400.0, 300.0);
        let w = p.world(&camera).unwrap();
        assert!(w.length() < 1e-2);

        p.move_to(600.0, 300.0);
        let w = p.world(&camera).unwrap();
        assert!(w.x > 0.0 && w.y.abs() < 1e-2 && w.z.abs() < 1e-3);

        p.handle(&PointerEvent::Leave);
        assert!(p.world(&camera).is_none());
    }
}
