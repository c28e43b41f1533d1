//! Polygons, pyramids, frustums, prisms and tetrahedra.

use cgmath::{Vector2, Vector3};

use crate::error::GeometryError;
use crate::gfx::color::{is_valid_color, Color};
use crate::gfx::primitive::Triangle;
use crate::gfx::shape::Shape;
use crate::math;

/// A regular polygon with circumradius 1 in the z = 0 plane, facing +Z.
///
/// Built as a triangle fan over [`math::points_on_circle_2d`], so the first
/// corner sits at the top and the winding is counter-clockwise.
pub fn make_polygon(id: &str, corners: usize, color: Color) -> Result<Shape, GeometryError> {
    if corners < 3 {
        return Err(GeometryError::InvalidCount("a polygon needs at least 3 corners"));
    }
    if !is_valid_color(&color) {
        return Err(GeometryError::InvalidColor);
    }
    let ring = math::points_on_circle_2d(Vector2::new(0.0, 0.0), 1.0, corners)
        .ok_or(GeometryError::InvalidCount("polygon corner count"))?;

    let center = Vector3::new(0.0, 0.0, 0.0);
    let mut triangles = Vec::with_capacity(corners);
    for i in 0..corners {
        triangles.push(Triangle::uniform(
            format!("{id}-{i}"),
            [center, ring[i], ring[(i + 1) % corners]],
            color,
        )?);
    }
    Shape::from_parts_vec(id, triangles, Vec::new())
}

/// A pyramid with a regular polygon base (circumradius 1) at y = -0.5 and
/// its apex at (0, 0.5, 0).
pub fn make_pyramid(id: &str, corners: usize, color: Color) -> Result<Shape, GeometryError> {
    if corners < 3 {
        return Err(GeometryError::InvalidCount("a pyramid needs at least 3 base corners"));
    }
    if !is_valid_color(&color) {
        return Err(GeometryError::InvalidColor);
    }
    let base_center = Vector3::new(0.0, -0.5, 0.0);
    let apex = Vector3::new(0.0, 0.5, 0.0);
    let ring = math::points_on_circle_3d(base_center, 1.0, Some(Vector3::unit_y()), corners)
        .ok_or(GeometryError::InvalidCount("pyramid corner count"))?;

    let mut triangles = Vec::with_capacity(corners * 2);
    for i in 0..corners {
        let next = (i + 1) % corners;
        triangles.push(Triangle::uniform(
            format!("{id}-side-{i}"),
            [ring[i], ring[next], apex],
            color,
        )?);
    }
    for i in 0..corners {
        let next = (i + 1) % corners;
        // base faces downward
        triangles.push(Triangle::uniform(
            format!("{id}-base-{i}"),
            [base_center, ring[next], ring[i]],
            color,
        )?);
    }
    Shape::from_parts_vec(id, triangles, Vec::new())
}

/// A capped frustum: a regular-polygon ring of `bottom_radius` at
/// y = -height/2 joined to a ring of `top_radius` at y = +height/2.
pub fn make_frustum(
    id: &str,
    corners: usize,
    bottom_radius: f32,
    top_radius: f32,
    height: f32,
    color: Color,
) -> Result<Shape, GeometryError> {
    if corners < 3 {
        return Err(GeometryError::InvalidCount("a frustum needs at least 3 corners"));
    }
    if bottom_radius <= 0.0 {
        return Err(GeometryError::InvalidDimension("bottom radius"));
    }
    if top_radius <= 0.0 {
        return Err(GeometryError::InvalidDimension("top radius"));
    }
    if height <= 0.0 {
        return Err(GeometryError::InvalidDimension("height"));
    }
    if !is_valid_color(&color) {
        return Err(GeometryError::InvalidColor);
    }

    let bottom_center = Vector3::new(0.0, -height / 2.0, 0.0);
    let top_center = Vector3::new(0.0, height / 2.0, 0.0);
    let up = Some(Vector3::unit_y());
    let bottom = math::points_on_circle_3d(bottom_center, bottom_radius, up, corners)
        .ok_or(GeometryError::InvalidCount("frustum corner count"))?;
    let top = math::points_on_circle_3d(top_center, top_radius, up, corners)
        .ok_or(GeometryError::InvalidCount("frustum corner count"))?;

    let mut triangles = Vec::with_capacity(corners * 4);
    for i in 0..corners {
        let next = (i + 1) % corners;
        triangles.push(Triangle::uniform(
            format!("{id}-side-{i}-a"),
            [bottom[i], bottom[next], top[next]],
            color,
        )?);
        triangles.push(Triangle::uniform(
            format!("{id}-side-{i}-b"),
            [top[next], top[i], bottom[i]],
            color,
        )?);
    }
    for i in 0..corners {
        let next = (i + 1) % corners;
        triangles.push(Triangle::uniform(
            format!("{id}-top-{i}"),
            [top_center, top[i], top[next]],
            color,
        )?);
        triangles.push(Triangle::uniform(
            format!("{id}-bottom-{i}"),
            [bottom_center, bottom[next], bottom[i]],
            color,
        )?);
    }
    Shape::from_parts_vec(id, triangles, Vec::new())
}

/// A prism of characteristic size 1: a frustum with equal top and bottom
/// radii 1 and height 1.
pub fn make_prism(id: &str, corners: usize, color: Color) -> Result<Shape, GeometryError> {
    make_frustum(id, corners, 1.0, 1.0, 1.0, color)
}

/// A regular tetrahedron with circumradius 1 centered at the origin.
pub fn make_tetrahedron(id: &str, color: Color) -> Result<Shape, GeometryError> {
    if !is_valid_color(&color) {
        return Err(GeometryError::InvalidColor);
    }
    let s = 1.0 / 3.0_f32.sqrt();
    let a = Vector3::new(s, s, s);
    let b = Vector3::new(s, -s, -s);
    let c = Vector3::new(-s, s, -s);
    let d = Vector3::new(-s, -s, s);

    let faces = [[a, b, c], [a, c, d], [a, d, b], [b, d, c]];
    let mut triangles = Vec::with_capacity(4);
    for (i, face) in faces.iter().enumerate() {
        triangles.push(Triangle::uniform(format!("{id}-{i}"), *face, color)?);
    }
    Shape::from_parts_vec(id, triangles, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn polygon_fans_counter_clockwise_from_the_top() {
        let shape = make_polygon("p", 6, Color::WHITE).unwrap();
        assert_eq!(shape.triangle_count(), 6);
        let triangles = shape.triangles();
        // first corner is the top of the circle
        assert!((triangles[0].vertices()[1] - Vector3::new(0.0, 1.0, 0.0)).magnitude() < 1e-5);
        // every face points +Z
        for t in &triangles {
            assert!(t.normal().unwrap().z > 0.99);
        }
    }

    #[test]
    fn polygon_rejects_degenerate_input() {
        assert_eq!(
            make_polygon("p", 2, Color::WHITE).unwrap_err(),
            GeometryError::InvalidCount("a polygon needs at least 3 corners")
        );
        assert_eq!(
            make_polygon("p", 4, Color::new(-1.0, 0.0, 0.0, 1.0)).unwrap_err(),
            GeometryError::InvalidColor
        );
    }

    #[test]
    fn pyramid_spans_unit_height() {
        let shape = make_pyramid("p", 8, Color::WHITE).unwrap();
        assert_eq!(shape.triangle_count(), 16);
        assert!((shape.intrinsic_size_y() - 1.0).abs() < 1e-5);
        // base circumradius 1; an 8-corner ring hits +-1 on both axes
        assert!((shape.intrinsic_size_x() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn pyramid_faces_wind_outward() {
        let shape = make_pyramid("p", 8, Color::WHITE).unwrap();
        for t in shape.triangles() {
            let normal = t.normal().unwrap();
            // outward means pointing away from the shape's inner point
            let inward = Vector3::new(0.0, 0.0, 0.0) - t.centroid();
            assert!(normal.dot(inward) < 0.0, "triangle {} winds inward", t.id());
        }
    }

    #[test]
    fn frustum_counts_and_extents() {
        let shape = make_frustum("f", 8, 2.0, 1.0, 3.0, Color::WHITE).unwrap();
        // per corner: 2 side + 1 top cap + 1 bottom cap
        assert_eq!(shape.triangle_count(), 32);
        assert!((shape.intrinsic_size_y() - 3.0).abs() < 1e-5);
        assert!((shape.intrinsic_size_x() - 4.0).abs() < 1e-2);
    }

    #[test]
    fn frustum_validates_dimensions() {
        assert_eq!(
            make_frustum("f", 8, 0.0, 1.0, 1.0, Color::WHITE).unwrap_err(),
            GeometryError::InvalidDimension("bottom radius")
        );
        assert_eq!(
            make_frustum("f", 8, 1.0, 1.0, -2.0, Color::WHITE).unwrap_err(),
            GeometryError::InvalidDimension("height")
        );
    }

    #[test]
    fn prism_is_a_unit_frustum() {
        let shape = make_prism("pr", 6, Color::WHITE).unwrap();
        assert_eq!(shape.triangle_count(), 24);
        assert!((shape.intrinsic_size_y() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn tetrahedron_has_unit_circumradius_and_outward_faces() {
        let shape = make_tetrahedron("t", Color::WHITE).unwrap();
        assert_eq!(shape.triangle_count(), 4);
        for t in shape.triangles() {
            for v in t.vertices() {
                assert!((v.magnitude() - 1.0).abs() < 1e-5);
            }
            assert!(t.normal().unwrap().dot(t.centroid()) > 0.0);
        }
    }
}
