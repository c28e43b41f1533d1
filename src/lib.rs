// src/lib.rs
//! Drystane 3D Scene Graph
//!
//! A retained-mode scene-graph library built on wgpu and winit: shapes made
//! of triangles and lines, composed by joining under affine transforms,
//! animated by repeating timers, rendered each frame with a per-shape model
//! matrix.

pub mod animation;
pub mod app;
pub mod error;
pub mod gfx;
pub mod math;
pub mod prelude;

// Re-export main types for convenience
pub use app::DrystaneApp;
pub use error::GeometryError;

/// Creates a default Drystane application instance
pub fn default() -> DrystaneApp {
    DrystaneApp::new()
}
