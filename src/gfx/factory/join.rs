//! Joining shapes: flattening several shapes' primitives, each under its
//! own affine transform, into one new shape.

use cgmath::{Deg, Vector3};

use crate::error::GeometryError;
use crate::gfx::primitive::{Line, Triangle};
use crate::gfx::shape::Shape;

/// Per-part affine transform applied while joining, with the same
/// composition as [`Triangle::transform`]: scale, then the Y/Z/X
/// rotations, then a world-space translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartTransform {
    pub scale: Vector3<f32>,
    pub rotation: [Deg<f32>; 3],
    pub translation: Vector3<f32>,
}

impl PartTransform {
    pub fn identity() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: [Deg(0.0); 3],
            translation: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn scaled(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotated(mut self, rotation: [Deg<f32>; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn translated(mut self, translation: Vector3<f32>) -> Self {
        self.translation = translation;
        self
    }
}

impl Default for PartTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Flattens `parts` into one new shape.
///
/// Each part contributes deep copies of its primitives (never live
/// references) with the matching [`PartTransform`] baked into their
/// vertices; primitive ids are prefixed with the part index to stay
/// unique. The parts' own model matrices are ignored -- joining operates
/// on local geometry.
///
/// `line_width` overrides the default if any lines are present.
/// `recenter` re-origins the result once via
/// [`Shape::move_center_to`]; in a chain of joins pass it only to the
/// final call, since re-origining twice double-shifts everything (the
/// function cannot detect that for you).
pub fn join_shapes(
    id: &str,
    parts: &[&Shape],
    transforms: &[PartTransform],
    line_width: Option<f32>,
    recenter: Option<Vector3<f32>>,
) -> Result<Shape, GeometryError> {
    if parts.is_empty() {
        return Err(GeometryError::InvalidCount("join needs at least one part"));
    }
    if parts.len() != transforms.len() {
        return Err(GeometryError::InvalidCount("join needs one transform per part"));
    }

    let mut triangles: Vec<Triangle> = Vec::new();
    let mut lines: Vec<Line> = Vec::new();
    for (index, (part, transform)) in parts.iter().zip(transforms).enumerate() {
        for triangle in part.triangles() {
            let mut t = triangle.copy(format!("{index}-{}", triangle.id()));
            t.transform(transform.scale, transform.rotation, transform.translation);
            triangles.push(t);
        }
        for line in part.lines() {
            let mut l = line.copy(format!("{index}-{}", line.id()));
            l.transform(transform.scale, transform.rotation, transform.translation);
            lines.push(l);
        }
    }

    let joined = Shape::from_parts_vec(id, triangles, lines)?;
    if let Some(width) = line_width {
        joined.set_line_width(width);
    }
    if let Some(center) = recenter {
        joined.move_center_to(center);
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::color::Color;
    use crate::gfx::factory::{make_cube, make_polygon};
    use cgmath::InnerSpace;
    use std::collections::BTreeSet;

    fn vertex_set(shape: &Shape) -> BTreeSet<[i64; 3]> {
        // quantized so float noise does not break set comparison
        shape
            .triangles()
            .iter()
            .flat_map(|t| t.vertices().iter().copied())
            .map(|v| {
                [
                    (v.x * 1e4).round() as i64,
                    (v.y * 1e4).round() as i64,
                    (v.z * 1e4).round() as i64,
                ]
            })
            .collect()
    }

    #[test]
    fn join_accumulates_all_primitives() {
        let cube = make_cube("c", &[Color::WHITE]).unwrap();
        let polygon = make_polygon("p", 5, Color::RED).unwrap();
        let joined = join_shapes(
            "j",
            &[&cube, &polygon],
            &[PartTransform::identity(), PartTransform::identity()],
            None,
            None,
        )
        .unwrap();
        assert_eq!(joined.triangle_count(), 12 + 5);
    }

    #[test]
    fn join_validates_part_and_transform_counts() {
        let cube = make_cube("c", &[Color::WHITE]).unwrap();
        assert!(join_shapes("j", &[], &[], None, None).is_err());
        assert!(join_shapes("j", &[&cube], &[], None, None).is_err());
    }

    #[test]
    fn join_transforms_copies_not_originals() {
        let cube = make_cube("c", &[Color::WHITE]).unwrap();
        let joined = join_shapes(
            "j",
            &[&cube],
            &[PartTransform::identity().translated(Vector3::new(10.0, 0.0, 0.0))],
            None,
            None,
        )
        .unwrap();
        // the original still spans [-0.5, 0.5]
        assert!(cube
            .triangles()
            .iter()
            .all(|t| t.vertices().iter().all(|v| v.x.abs() <= 0.5)));
        assert!(joined
            .triangles()
            .iter()
            .all(|t| t.vertices().iter().all(|v| v.x >= 9.0)));
    }

    #[test]
    fn join_geometry_is_associative() {
        let a = make_cube("a", &[Color::WHITE]).unwrap();
        let b = make_polygon("b", 4, Color::RED).unwrap();
        let c = make_polygon("c", 7, Color::BLUE).unwrap();
        let ta = PartTransform::identity().translated(Vector3::new(1.0, 0.0, 0.0));
        let tb = PartTransform::identity().translated(Vector3::new(0.0, 2.0, 0.0));
        let tc = PartTransform::identity().translated(Vector3::new(0.0, 0.0, 3.0));

        let left = {
            let ab = join_shapes("ab", &[&a, &b], &[ta, tb], None, None).unwrap();
            join_shapes("abc", &[&ab, &c], &[PartTransform::identity(), tc], None, None).unwrap()
        };
        let right = {
            let bc = join_shapes("bc", &[&b, &c], &[tb, tc], None, None).unwrap();
            join_shapes("abc", &[&a, &bc], &[ta, PartTransform::identity()], None, None).unwrap()
        };

        assert_eq!(left.triangle_count(), right.triangle_count());
        assert_eq!(left.line_count(), right.line_count());
        assert_eq!(vertex_set(&left), vertex_set(&right));
    }

    #[test]
    fn recenter_shifts_local_geometry_once() {
        let cube = make_cube("c", &[Color::WHITE]).unwrap();
        let joined = join_shapes(
            "j",
            &[&cube],
            &[PartTransform::identity()],
            None,
            Some(Vector3::new(0.5, 0.5, 0.5)),
        )
        .unwrap();
        // the old corner (0.5, 0.5, 0.5) is the new origin
        let min = joined
            .triangles()
            .iter()
            .flat_map(|t| t.vertices().iter().copied())
            .fold(f32::INFINITY, |acc, v| acc.min(v.x.min(v.y).min(v.z)));
        assert!((min + 1.0).abs() < 1e-5);
        assert!(joined
            .triangles()
            .iter()
            .flat_map(|t| t.vertices().iter().copied())
            .all(|v| v.x <= 1e-5 && v.magnitude() < 2.0));
    }

    #[test]
    fn part_transform_scales_before_rotating() {
        let polygon = make_polygon("p", 4, Color::WHITE).unwrap();
        let joined = join_shapes(
            "j",
            &[&polygon],
            &[PartTransform::identity()
                .scaled(Vector3::new(2.0, 2.0, 2.0))
                .rotated([Deg(0.0), Deg(90.0), Deg(0.0)])],
            None,
            None,
        )
        .unwrap();
        // top corner (0, 1, 0) is untouched by the Y rotation, then doubles
        let top = joined.triangles()[0].vertices()[1];
        assert!((top - Vector3::new(0.0, 2.0, 0.0)).magnitude() < 1e-5);
    }
}
