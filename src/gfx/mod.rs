//! # Graphics Module
//!
//! Everything between raw geometry and the screen:
//!
//! - **Primitives** ([`primitive`]) - triangles and lines with in-place
//!   affine transforms
//! - **Shapes** ([`shape`]) - primitive collections with a decomposed
//!   model transform, shared between the render loop and animators
//! - **Factory** ([`factory`]) - procedural solids, subdivision spheres
//!   and shape joining
//! - **Composition** ([`composer`]) - placing shape collections on lines,
//!   circles and grids
//! - **Surface & Camera** ([`surface`], [`camera`]) - the registered shape
//!   set, view-projection state and lifecycle callbacks
//! - **Render Engine** ([`render_engine`]) - the wgpu boundary

pub mod camera;
pub mod color;
pub mod composer;
pub mod factory;
pub mod primitive;
pub mod render_engine;
pub mod shape;
pub mod surface;

// Re-export commonly used types
pub use color::Color;
pub use primitive::{Coloring, Line, TextureHandle, Triangle};
pub use render_engine::RenderEngine;
pub use shape::{Axis, Shape};
pub use surface::Surface;
