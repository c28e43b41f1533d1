//! # Geometric Primitives
//!
//! The smallest drawable units: [`Triangle`] (three vertices plus a coloring
//! mode) and [`Line`] (two endpoints plus a color). Both support an in-place
//! affine transform that bakes scale/rotation/translation into their local
//! coordinates; shapes deep-copy primitives at every public boundary so no
//! two shapes ever alias the same vertex data.

pub mod line;
pub mod triangle;

pub use line::Line;
pub use triangle::{Coloring, Triangle};

/// Opaque handle to a host-decoded bitmap.
///
/// The library never decodes images; the render engine maps handles to GPU
/// textures registered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);
