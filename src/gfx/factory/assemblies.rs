//! Composite shapes assembled by joining simpler parts.

use cgmath::{Deg, Vector3};

use crate::error::GeometryError;
use crate::gfx::color::{is_valid_color, Color};
use crate::gfx::shape::Shape;

use super::join::{join_shapes, PartTransform};
use super::solids::{make_prism, make_pyramid};

/// An arrow of length 1 pointing along +Y with its tail at the origin:
/// an 8-sided prism shaft joined with a pyramid head.
pub fn make_arrow(id: &str, color: Color) -> Result<Shape, GeometryError> {
    if !is_valid_color(&color) {
        return Err(GeometryError::InvalidColor);
    }
    let shaft = make_prism(&format!("{id}-shaft"), 8, color)?;
    let head = make_pyramid(&format!("{id}-head"), 8, color)?;

    // shaft squashed to y in [-0.4, 0.4] then lifted to [0, 0.8]; head
    // squashed to [-0.1, 0.1] then lifted to [0.8, 1.0]
    let shaft_placement = PartTransform::identity()
        .scaled(Vector3::new(0.05, 0.8, 0.05))
        .translated(Vector3::new(0.0, 0.4, 0.0));
    let head_placement = PartTransform::identity()
        .scaled(Vector3::new(0.12, 0.2, 0.12))
        .translated(Vector3::new(0.0, 0.9, 0.0));

    join_shapes(
        id,
        &[&shaft, &head],
        &[shaft_placement, head_placement],
        None,
        None,
    )
}

/// A coordinate-axes marker: three unit arrows from the origin along +X
/// (red), +Y (green) and +Z (blue), flattened into one shape.
pub fn make_axes_marker(id: &str) -> Result<Shape, GeometryError> {
    let x_arrow = make_arrow(&format!("{id}-x"), Color::RED)?;
    let y_arrow = make_arrow(&format!("{id}-y"), Color::GREEN)?;
    let z_arrow = make_arrow(&format!("{id}-z"), Color::BLUE)?;

    // each arrow points +Y; rotate two of them onto +X and +Z
    let to_x = PartTransform::identity().rotated([Deg(0.0), Deg(0.0), Deg(-90.0)]);
    let to_y = PartTransform::identity();
    let to_z = PartTransform::identity().rotated([Deg(90.0), Deg(0.0), Deg(0.0)]);

    join_shapes(
        id,
        &[&x_arrow, &y_arrow, &z_arrow],
        &[to_x, to_y, to_z],
        None,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_spans_unit_length_along_y() {
        let arrow = make_arrow("a", Color::WHITE).unwrap();
        // 8-corner prism (32 triangles) + 8-corner pyramid (16 triangles)
        assert_eq!(arrow.triangle_count(), 48);
        assert!((arrow.intrinsic_size_y() - 1.0).abs() < 1e-4);
        let lowest = arrow
            .triangles()
            .iter()
            .flat_map(|t| t.vertices().iter().map(|v| v.y))
            .fold(f32::INFINITY, f32::min);
        assert!(lowest.abs() < 1e-5);
    }

    #[test]
    fn arrow_rejects_invalid_color() {
        assert_eq!(
            make_arrow("a", Color::new(0.0, 0.0, 5.0, 1.0)).unwrap_err(),
            GeometryError::InvalidColor
        );
    }

    #[test]
    fn axes_marker_reaches_one_along_each_axis() {
        let marker = make_axes_marker("axes").unwrap();
        assert_eq!(marker.triangle_count(), 3 * 48);
        let mut max = Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for t in marker.triangles() {
            for v in t.vertices() {
                max = Vector3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z));
            }
        }
        assert!((max.x - 1.0).abs() < 1e-4);
        assert!((max.y - 1.0).abs() < 1e-4);
        assert!((max.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn axes_marker_keeps_per_axis_colors() {
        let marker = make_axes_marker("axes").unwrap();
        let triangles = marker.triangles();
        assert_eq!(triangles[0].uniform_color(), Some(Color::RED));
        assert_eq!(triangles[48].uniform_color(), Some(Color::GREEN));
        assert_eq!(triangles[96].uniform_color(), Some(Color::BLUE));
    }
}
