//! # Procedural Shape Construction
//!
//! Constructors for the basic solids (polygons, cuboids, pyramids,
//! frustums, prisms, tetrahedra, subdivision spheres), the shape-joining
//! operation that flattens several shapes into one, and a couple of
//! composite assemblies built on top of it.
//!
//! Conventions shared by every basic solid:
//!
//! - centered at the local origin with characteristic size 1 (edge length
//!   or circumradius); callers scale via the model transform,
//! - polygon-derived geometry inherits the counter-clockwise winding of
//!   [`crate::math::points_on_circle_2d`],
//! - colors are validated before any geometry is allocated; invalid input
//!   returns an error, never a partial shape.

pub mod assemblies;
pub mod cuboid;
pub mod join;
pub mod solids;
pub mod sphere;

pub use assemblies::{make_arrow, make_axes_marker};
pub use cuboid::{make_cube, make_cuboid, triangles_for_colored_cuboid};
pub use join::{join_shapes, PartTransform};
pub use solids::{make_frustum, make_polygon, make_prism, make_pyramid, make_tetrahedron};
pub use sphere::{make_hemisphere, make_sphere};
