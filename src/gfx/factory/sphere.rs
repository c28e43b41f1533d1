//! Sphere and hemisphere approximation by iterative subdivision.
//!
//! Both start from an 8-sided (bi)pyramid, split every triangle into four
//! by edge-midpoint subdivision for a number of rounds, then project every
//! vertex onto the unit sphere. The algorithm is deterministic: the same
//! inputs always produce the same mesh, and the triangle count after `n`
//! rounds is exactly `base * 4^n`.

use cgmath::Vector3;

use crate::error::GeometryError;
use crate::gfx::color::{is_valid_colors, Color};
use crate::gfx::primitive::Triangle;
use crate::gfx::shape::Shape;
use crate::math;

/// Corners of the base (bi)pyramid ring.
const RING_CORNERS: usize = 8;

/// A unit sphere approximated from a 16-triangle bipyramid with
/// `iterations` rounds of subdivision (3 to 4 give a visually smooth
/// ball).
///
/// Base colors cycle through `colors`; the lower fan's assignment is
/// shifted by one relative to the upper fan, a quirk kept from the
/// original construction.
pub fn make_sphere(id: &str, iterations: usize, colors: &[Color]) -> Result<Shape, GeometryError> {
    if !is_valid_colors(colors) {
        return Err(GeometryError::InvalidColor);
    }
    let ring = equator_ring()?;
    let top = Vector3::new(0.0, 1.0, 0.0);
    let bottom = Vector3::new(0.0, -1.0, 0.0);

    let mut triangles = Vec::with_capacity(RING_CORNERS * 2);
    for i in 0..RING_CORNERS {
        let next = (i + 1) % RING_CORNERS;
        triangles.push(Triangle::uniform(
            format!("{id}-u{i}"),
            [ring[i], ring[next], top],
            colors[i % colors.len()],
        )?);
    }
    for i in 0..RING_CORNERS {
        let next = (i + 1) % RING_CORNERS;
        triangles.push(Triangle::uniform(
            format!("{id}-l{i}"),
            [ring[next], ring[i], bottom],
            colors[(i + 1) % colors.len()],
        )?);
    }

    finish_subdivided(id, triangles, iterations)
}

/// The upper half of [`make_sphere`]: an 8-triangle pyramid fan subdivided
/// and projected onto the unit sphere, with an open equator base.
pub fn make_hemisphere(
    id: &str,
    iterations: usize,
    colors: &[Color],
) -> Result<Shape, GeometryError> {
    if !is_valid_colors(colors) {
        return Err(GeometryError::InvalidColor);
    }
    let ring = equator_ring()?;
    let top = Vector3::new(0.0, 1.0, 0.0);

    let mut triangles = Vec::with_capacity(RING_CORNERS);
    for i in 0..RING_CORNERS {
        let next = (i + 1) % RING_CORNERS;
        triangles.push(Triangle::uniform(
            format!("{id}-u{i}"),
            [ring[i], ring[next], top],
            colors[i % colors.len()],
        )?);
    }

    finish_subdivided(id, triangles, iterations)
}

fn equator_ring() -> Result<Vec<Vector3<f32>>, GeometryError> {
    math::points_on_circle_3d(
        Vector3::new(0.0, 0.0, 0.0),
        1.0,
        Some(Vector3::unit_y()),
        RING_CORNERS,
    )
    .ok_or(GeometryError::InvalidCount("sphere ring corner count"))
}

fn finish_subdivided(
    id: &str,
    mut triangles: Vec<Triangle>,
    iterations: usize,
) -> Result<Shape, GeometryError> {
    for _ in 0..iterations {
        triangles = subdivide(triangles);
    }
    for t in &mut triangles {
        t.normalize_vertices()?;
    }
    Shape::from_parts_vec(id, triangles, Vec::new())
}

/// Splits every triangle into four by edge midpoints, preserving winding
/// and coloring. Child ids append `-0` through `-3` to the parent id.
fn subdivide(triangles: Vec<Triangle>) -> Vec<Triangle> {
    let mut out = Vec::with_capacity(triangles.len() * 4);
    for t in triangles {
        let [v0, v1, v2] = *t.vertices();
        let m01 = (v0 + v1) / 2.0;
        let m12 = (v1 + v2) / 2.0;
        let m20 = (v2 + v0) / 2.0;
        let children = [
            [v0, m01, m20],
            [m01, v1, m12],
            [m20, m12, v2],
            [m01, m12, m20],
        ];
        for (k, vertices) in children.into_iter().enumerate() {
            out.push(Triangle::new(
                format!("{}-{k}", t.id()),
                vertices,
                t.coloring().clone(),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn sphere_triangle_count_grows_by_powers_of_four() {
        for iterations in 0..4 {
            let sphere = make_sphere("s", iterations, &[Color::WHITE]).unwrap();
            assert_eq!(
                sphere.triangle_count(),
                16 * 4usize.pow(iterations as u32),
                "iterations = {iterations}"
            );
        }
    }

    #[test]
    fn every_sphere_vertex_sits_on_the_unit_sphere() {
        let sphere = make_sphere("s", 3, &[Color::WHITE]).unwrap();
        for t in sphere.triangles() {
            for v in t.vertices() {
                assert!((v.magnitude() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn sphere_construction_is_deterministic() {
        let a = make_sphere("s", 2, &[Color::RED, Color::GREEN]).unwrap();
        let b = make_sphere("s", 2, &[Color::RED, Color::GREEN]).unwrap();
        let (ta, tb) = (a.triangles(), b.triangles());
        assert_eq!(ta.len(), tb.len());
        for (x, y) in ta.iter().zip(&tb) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn base_color_assignment_shifts_the_lower_fan_by_one() {
        let colors = [Color::RED, Color::GREEN, Color::BLUE];
        let sphere = make_sphere("s", 0, &colors).unwrap();
        let triangles = sphere.triangles();
        for i in 0..8 {
            assert_eq!(triangles[i].uniform_color(), Some(colors[i % 3]));
            assert_eq!(
                triangles[8 + i].uniform_color(),
                Some(colors[(i + 1) % 3])
            );
        }
    }

    #[test]
    fn sphere_rejects_invalid_colors() {
        assert_eq!(
            make_sphere("s", 2, &[]).unwrap_err(),
            GeometryError::InvalidColor
        );
        assert_eq!(
            make_sphere("s", 2, &[Color::new(0.0, 7.0, 0.0, 1.0)]).unwrap_err(),
            GeometryError::InvalidColor
        );
    }

    #[test]
    fn hemisphere_counts_and_stays_above_the_equator() {
        let hemisphere = make_hemisphere("h", 2, &[Color::WHITE]).unwrap();
        assert_eq!(hemisphere.triangle_count(), 8 * 16);
        for t in hemisphere.triangles() {
            for v in t.vertices() {
                assert!((v.magnitude() - 1.0).abs() < 1e-5);
                assert!(v.y > -1e-6);
            }
        }
    }

    #[test]
    fn sphere_faces_wind_outward() {
        let sphere = make_sphere("s", 1, &[Color::WHITE]).unwrap();
        for t in sphere.triangles() {
            let normal = t.normal().unwrap();
            assert!(normal.dot(t.centroid()) > 0.0, "triangle {} winds inward", t.id());
        }
    }
}
