//! Firefly Boundary - UI text regions in world space
//!
//! Converts the padded screen rectangles of selected UI elements into
//! rectangles on the z=0 world plane and answers the containment,
//! repulsion and safe-spawn queries the particle engine uses to keep
//! fireflies clear of text.

pub mod config;
pub mod index;

pub use config::BoundaryConfig;
pub use index::{Boundary, BoundaryIndex, DEFAULT_SAFE_ATTEMPTS};
