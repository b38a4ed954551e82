//! Firefly Core - Foundational types for the firefly scene engine
//!
//! This crate provides the types every other firefly crate depends on:
//! - `Vec2`, `Vec3`, `Color`, `Aabb` - Spatial and color types
//! - `Camera` - Perspective camera with screen-to-plane unprojection
//! - `LayoutSnapshot` - Per-frame copy of the UI layout the engines read
//! - `TransformSink` - Seam through which computed transforms leave the core
//! - `SceneRng` - Injectable seeded random source
//! - Error types and Result alias

mod camera;
mod error;
mod layout;
mod present;
mod rng;
mod types;

pub use camera::{Camera, CameraConfig};
pub use error::{FireflyError, Result};
pub use layout::{ElementKey, LayoutNode, LayoutSnapshot, ScreenRect, Selector, Viewport};
pub use present::{ElementTransform, RecordingSink, TransformSink};
pub use rng::SceneRng;
pub use types::{Aabb, Color, Vec2, Vec3};
