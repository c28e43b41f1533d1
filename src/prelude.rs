//! # Drystane Prelude
//!
//! One-stop import for typical applications:
//!
//! ```no_run
//! use drystane::prelude::*;
//!
//! let app = drystane::default();
//! let surface = app.surface();
//!
//! let cube = Arc::new(make_cube("cube", &[Color::RED]).unwrap());
//! cube.set_rotation(Deg(30.0), Vector3::unit_y()).unwrap();
//! surface.add_shape(cube);
//!
//! surface.set_view_matrix(Vector3::new(0.0, 2.0, 6.0), Vector3::new(0.0, 0.0, 0.0));
//! app.run();
//! ```

// Re-export core application types
pub use crate::app::DrystaneApp;
pub use crate::default;

// Re-export graphics and scene types
pub use crate::gfx::color::Color;
pub use crate::gfx::composer::{place_in_grid, place_on_circle, place_on_line};
pub use crate::gfx::factory::{
    join_shapes, make_arrow, make_axes_marker, make_cube, make_cuboid, make_frustum,
    make_hemisphere, make_polygon, make_prism, make_pyramid, make_sphere, make_tetrahedron,
    PartTransform,
};
pub use crate::gfx::primitive::{Coloring, Line, TextureHandle, Triangle};
pub use crate::gfx::shape::{Axis, Shape};
pub use crate::gfx::surface::Surface;

// Re-export animation types
pub use crate::animation::{AnimationHandle, AnimationTick};

// Re-export error type
pub use crate::error::GeometryError;

// Re-export common external dependencies
pub use cgmath::{Deg, InnerSpace, Matrix4, Vector3, Zero};

// Re-export common standard library types
pub use std::sync::Arc;
pub use std::time::Duration;
