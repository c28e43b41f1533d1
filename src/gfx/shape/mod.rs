//! # Shape Management
//!
//! A [`Shape`] owns a collection of primitives plus a decomposed model
//! transform and is the unit of registration, animation and drawing. This
//! module also holds the CPU-side render buffer caches a shape keeps warm
//! for the render engine.

pub mod buffers;
pub mod shape;

pub use buffers::ShapeColoring;
pub use shape::{Axis, Shape, DEFAULT_LINE_WIDTH};
