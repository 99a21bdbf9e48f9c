//! Click-to-recolor picking for loaded meshes.
//!
//! A click at a pixel is turned into a world-space ray, the nearest
//! front-facing triangle among the registered meshes is found, and every
//! material slot of that mesh takes the currently selected color.

pub mod app;
pub mod assets;
pub mod color;
pub mod pick;
pub mod render;
pub mod scene;
