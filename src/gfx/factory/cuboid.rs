//! Cuboid construction.

use cgmath::Vector3;

use crate::error::GeometryError;
use crate::gfx::color::{is_valid_colors, Color};
use crate::gfx::primitive::Triangle;
use crate::gfx::shape::Shape;

/// Color counts a cuboid accepts: uniform, per-face, or per-triangle.
const CUBOID_COLOR_COUNTS: &[usize] = &[1, 6, 12];

/// The 12 triangles of an axis-aligned cuboid spanning
/// `[-w/2, w/2] x [-h/2, h/2] x [-d/2, d/2]`.
///
/// Triangle order is fixed: front, right, back, left, top, bottom, two
/// triangles each (ids `{id}-front-a`, `{id}-front-b`, ...), wound
/// counter-clockwise seen from outside. Color assignment by count:
/// 1 = uniform, 6 = one per face (triangle `i` takes `colors[i / 2]`),
/// 12 = one per triangle.
pub fn triangles_for_colored_cuboid(
    id: &str,
    width: f32,
    height: f32,
    depth: f32,
    colors: &[Color],
) -> Result<Vec<Triangle>, GeometryError> {
    if width <= 0.0 {
        return Err(GeometryError::InvalidDimension("width"));
    }
    if height <= 0.0 {
        return Err(GeometryError::InvalidDimension("height"));
    }
    if depth <= 0.0 {
        return Err(GeometryError::InvalidDimension("depth"));
    }
    if !is_valid_colors(colors) {
        return Err(GeometryError::InvalidColor);
    }
    if !CUBOID_COLOR_COUNTS.contains(&colors.len()) {
        return Err(GeometryError::InvalidColorCount {
            expected: CUBOID_COLOR_COUNTS,
            got: colors.len(),
        });
    }

    let (w, h, d) = (width / 2.0, height / 2.0, depth / 2.0);
    // front face corners first, then the back face, both bottom-left first
    let p = [
        Vector3::new(-w, -h, d),
        Vector3::new(w, -h, d),
        Vector3::new(w, h, d),
        Vector3::new(-w, h, d),
        Vector3::new(-w, -h, -d),
        Vector3::new(w, -h, -d),
        Vector3::new(w, h, -d),
        Vector3::new(-w, h, -d),
    ];

    let faces: [(&str, [usize; 6]); 6] = [
        ("front", [0, 1, 2, 2, 3, 0]),
        ("right", [1, 5, 6, 6, 2, 1]),
        ("back", [5, 4, 7, 7, 6, 5]),
        ("left", [4, 0, 3, 3, 7, 4]),
        ("top", [3, 2, 6, 6, 7, 3]),
        ("bottom", [4, 5, 1, 1, 0, 4]),
    ];

    let mut triangles = Vec::with_capacity(12);
    for (face_index, (name, indices)) in faces.iter().enumerate() {
        for half in 0..2 {
            let triangle_index = face_index * 2 + half;
            let color = match colors.len() {
                1 => colors[0],
                6 => colors[triangle_index / 2],
                _ => colors[triangle_index],
            };
            let suffix = if half == 0 { "a" } else { "b" };
            let vertices = [
                p[indices[half * 3]],
                p[indices[half * 3 + 1]],
                p[indices[half * 3 + 2]],
            ];
            triangles.push(Triangle::uniform(
                format!("{id}-{name}-{suffix}"),
                vertices,
                color,
            )?);
        }
    }
    Ok(triangles)
}

/// A cuboid shape spanning `[-w/2, w/2] x [-h/2, h/2] x [-d/2, d/2]`.
pub fn make_cuboid(
    id: &str,
    width: f32,
    height: f32,
    depth: f32,
    colors: &[Color],
) -> Result<Shape, GeometryError> {
    let triangles = triangles_for_colored_cuboid(id, width, height, depth, colors)?;
    Shape::from_parts_vec(id, triangles, Vec::new())
}

/// A unit cube (edge length 1) centered at the origin.
pub fn make_cube(id: &str, colors: &[Color]) -> Result<Shape, GeometryError> {
    make_cuboid(id, 1.0, 1.0, 1.0, colors)
}
