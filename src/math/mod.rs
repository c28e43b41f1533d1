//! # Vector and Matrix Utilities
//!
//! Free functions over `cgmath` 3-vectors and 4x4 matrices used throughout
//! the shape and factory layers: normalization, circle point generation,
//! axis-angle extraction from rotation matrices, Euler composition and the
//! combined affine transform used to bake geometry into local coordinates.
//!
//! Operations that can fail on degenerate input (a near-zero vector has no
//! direction) return `Option` instead of panicking. Operations whose invalid
//! inputs are unrepresentable with `Vector3` (wrong-length arrays, nulls)
//! are total.

use cgmath::{Deg, InnerSpace, Matrix4, Rad, SquareMatrix, Vector2, Vector3};

/// Vectors shorter than this have no usable direction.
pub const MIN_VECTOR_LENGTH: f32 = 1e-9;

/// Below this magnitude the antisymmetric part of a rotation matrix is
/// treated as zero, i.e. the rotation is by 0 or 180 degrees.
const SYMMETRY_EPS: f32 = 1e-4;

/// Scales `v` to unit length, or `None` if `|v| < MIN_VECTOR_LENGTH`.
pub fn normalize(v: Vector3<f32>) -> Option<Vector3<f32>> {
    let len = v.magnitude();
    if len < MIN_VECTOR_LENGTH {
        return None;
    }
    Some(v / len)
}

/// Standard 3D dot product.
pub fn dot(a: Vector3<f32>, b: Vector3<f32>) -> f32 {
    a.dot(b)
}

/// Standard 3D cross product.
pub fn cross(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    a.cross(b)
}

/// Euclidean distance between two points.
pub fn distance(a: Vector3<f32>, b: Vector3<f32>) -> f32 {
    (b - a).magnitude()
}

/// Applies an affine matrix to a point (w = 1).
pub fn transform_point(m: &Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
    (m * p.extend(1.0)).truncate()
}

/// `n` points on a circle in the z = 0 plane.
///
/// The first point sits at the top of the circle (`center + (0, radius)`)
/// and subsequent points proceed counter-clockwise. This ordering is the
/// canonical winding for all polygon construction, so every polygon-based
/// shape inherits it.
///
/// Returns `None` for `n == 0` or a non-positive radius.
pub fn points_on_circle_2d(
    center: Vector2<f32>,
    radius: f32,
    n: usize,
) -> Option<Vec<Vector3<f32>>> {
    if n == 0 || radius <= 0.0 {
        return None;
    }
    let step = std::f32::consts::TAU / n as f32;
    let points = (0..n)
        .map(|i| {
            let angle = i as f32 * step;
            // (0, r) rotated counter-clockwise by `angle`
            Vector3::new(
                center.x - radius * angle.sin(),
                center.y + radius * angle.cos(),
                0.0,
            )
        })
        .collect();
    Some(points)
}

/// `n` points on a circle in 3D space.
///
/// Builds the canonical 2D circle, rotates it so its +Z normal aligns with
/// `perpendicular`, then translates it to `center`. A missing perpendicular
/// (or one already parallel to +Z) leaves the circle in the z-plane; an
/// anti-parallel perpendicular flips it 180 degrees about an arbitrary
/// orthogonal axis.
///
/// Returns `None` for `n == 0`, a non-positive radius, or a degenerate
/// perpendicular vector.
pub fn points_on_circle_3d(
    center: Vector3<f32>,
    radius: f32,
    perpendicular: Option<Vector3<f32>>,
    n: usize,
) -> Option<Vec<Vector3<f32>>> {
    let flat = points_on_circle_2d(Vector2::new(0.0, 0.0), radius, n)?;

    let rotation = match perpendicular {
        None => Matrix4::identity(),
        Some(p) => {
            let (angle, axis) = rotation_between(Vector3::unit_z(), p)?;
            if angle < Rad(SYMMETRY_EPS) {
                Matrix4::identity()
            } else {
                Matrix4::from_axis_angle(axis, angle)
            }
        }
    };

    Some(
        flat.into_iter()
            .map(|p| transform_point(&rotation, p) + center)
            .collect(),
    )
}

/// Angle and unit axis rotating `from` onto `to`.
///
/// `None` if either vector is degenerate. When the vectors are parallel the
/// axis is arbitrary (unit Y for angle 0, any orthogonal of `from` for
/// 180 degrees) since the rotation is underdetermined there.
pub fn rotation_between(
    from: Vector3<f32>,
    to: Vector3<f32>,
) -> Option<(Rad<f32>, Vector3<f32>)> {
    let f = normalize(from)?;
    let t = normalize(to)?;
    let angle = Rad(f.dot(t).clamp(-1.0, 1.0).acos());
    let axis = f.cross(t);
    if axis.magnitude() < MIN_VECTOR_LENGTH {
        if angle < Rad(SYMMETRY_EPS) {
            return Some((Rad(0.0), Vector3::unit_y()));
        }
        return Some((angle, any_orthogonal(f)));
    }
    Some((angle, axis.normalize()))
}

/// Some unit vector orthogonal to `v` (which must itself be unit-length).
fn any_orthogonal(v: Vector3<f32>) -> Vector3<f32> {
    let candidate = v.cross(Vector3::unit_x());
    if candidate.magnitude() > SYMMETRY_EPS {
        return candidate.normalize();
    }
    v.cross(Vector3::unit_y()).normalize()
}

/// Rotation angle encoded in the upper 3x3 of `m`, in [0, 180] degrees.
///
/// `m` must be a pure rotation (possibly embedded in an affine matrix with
/// translation); scaling skews the trace and the result is meaningless.
pub fn rotation_angle_from_matrix(m: &Matrix4<f32>) -> Deg<f32> {
    let trace = m[0][0] + m[1][1] + m[2][2];
    Deg::from(Rad(((trace - 1.0) * 0.5).clamp(-1.0, 1.0).acos()))
}

/// Rotation axis encoded in the upper 3x3 of `m`.
///
/// The general case reads the antisymmetric part, which vanishes for
/// rotations by exactly 0 or 180 degrees; those are recovered from the
/// diagonal instead. The identity matrix maps to unit Y with angle 0 --
/// any unit axis would be equally correct there.
pub fn rotation_axis_from_matrix(m: &Matrix4<f32>) -> Vector3<f32> {
    // cgmath indexing is m[column][row]; R(row i, col j) = m[j][i].
    let anti = Vector3::new(
        m[1][2] - m[2][1],
        m[2][0] - m[0][2],
        m[0][1] - m[1][0],
    );
    if anti.magnitude() > SYMMETRY_EPS {
        // anti = 2 sin(angle) * axis
        return anti.normalize();
    }

    let angle = rotation_angle_from_matrix(m);
    if angle < Deg(90.0) {
        // Identity (angle ~ 0): underdetermined by design.
        return Vector3::unit_y();
    }

    // 180 degrees: R = 2*u*u^T - I, so u_i^2 = (R_ii + 1) / 2.
    let sq = Vector3::new(
        ((m[0][0] + 1.0) * 0.5).max(0.0),
        ((m[1][1] + 1.0) * 0.5).max(0.0),
        ((m[2][2] + 1.0) * 0.5).max(0.0),
    );
    let axis = if sq.x >= sq.y && sq.x >= sq.z {
        let x = sq.x.sqrt();
        Vector3::new(x, m[0][1] / (2.0 * x), m[0][2] / (2.0 * x))
    } else if sq.y >= sq.z {
        let y = sq.y.sqrt();
        Vector3::new(m[1][0] / (2.0 * y), y, m[1][2] / (2.0 * y))
    } else {
        let z = sq.z.sqrt();
        Vector3::new(m[2][0] / (2.0 * z), m[2][1] / (2.0 * z), z)
    };
    axis.normalize()
}

/// Rotation matrix from per-axis Euler angles, applied X first, then Z,
/// then Y (the column-vector matrix is `Ry * Rz * Rx`).
///
/// The order is part of the contract: Euler composition is non-commutative
/// and callers depend on this exact sequence.
pub fn rotation_from_euler_angles(x: Deg<f32>, y: Deg<f32>, z: Deg<f32>) -> Matrix4<f32> {
    Matrix4::from_angle_y(y) * Matrix4::from_angle_z(z) * Matrix4::from_angle_x(x)
}

/// Combined affine transform used to bake geometry into local coordinates:
/// scale, then rotY, then rotZ, then rotX, then translate, in this exact
/// application order (the column-vector matrix is
/// `T * Rx * Rz * Ry * S`).
///
/// A rotation factor whose angle is exactly zero is skipped rather than
/// multiplied in as an identity, so it contributes no rounding error.
pub fn composed_transform(
    scale: Vector3<f32>,
    rotation: [Deg<f32>; 3],
    translation: Vector3<f32>,
) -> Matrix4<f32> {
    let mut m = Matrix4::from_translation(translation);
    let [rx, ry, rz] = rotation;
    if rx != Deg(0.0) {
        m = m * Matrix4::from_angle_x(rx);
    }
    if rz != Deg(0.0) {
        m = m * Matrix4::from_angle_z(rz);
    }
    if ry != Deg(0.0) {
        m = m * Matrix4::from_angle_y(ry);
    }
    m * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    fn assert_vec_near(a: Vector3<f32>, b: Vector3<f32>, tol: f32) {
        assert!(
            (a - b).magnitude() < tol,
            "expected {:?} ~ {:?} (tol {})",
            a,
            b,
            tol
        );
    }

    #[test]
    fn normalize_rejects_near_zero() {
        assert!(normalize(Vector3::zero()).is_none());
        assert!(normalize(Vector3::new(1e-12, 0.0, 0.0)).is_none());
        let v = normalize(Vector3::new(0.0, 3.0, 4.0)).unwrap();
        assert_vec_near(v, Vector3::new(0.0, 0.6, 0.8), 1e-6);
    }

    #[test]
    fn circle_2d_starts_at_top_and_runs_counter_clockwise() {
        let points = points_on_circle_2d(Vector2::new(0.0, 0.0), 2.0, 4).unwrap();
        assert_eq!(points.len(), 4);
        assert_vec_near(points[0], Vector3::new(0.0, 2.0, 0.0), 1e-5);
        assert_vec_near(points[1], Vector3::new(-2.0, 0.0, 0.0), 1e-5);
        assert_vec_near(points[2], Vector3::new(0.0, -2.0, 0.0), 1e-5);
        assert_vec_near(points[3], Vector3::new(2.0, 0.0, 0.0), 1e-5);
        for p in &points {
            assert!((p.magnitude() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn circle_2d_rejects_bad_input() {
        assert!(points_on_circle_2d(Vector2::new(0.0, 0.0), 2.0, 0).is_none());
        assert!(points_on_circle_2d(Vector2::new(0.0, 0.0), 0.0, 4).is_none());
        assert!(points_on_circle_2d(Vector2::new(0.0, 0.0), -1.0, 4).is_none());
    }

    #[test]
    fn circle_3d_aligns_normal_with_perpendicular() {
        let perp = Vector3::new(0.0, 1.0, 0.0);
        let points =
            points_on_circle_3d(Vector3::new(1.0, 2.0, 3.0), 1.5, Some(perp), 8).unwrap();
        assert_eq!(points.len(), 8);
        for p in &points {
            let offset = p - Vector3::new(1.0, 2.0, 3.0);
            // every point lies in the plane through center normal to perp
            assert!(offset.dot(perp).abs() < 1e-5);
            assert!((offset.magnitude() - 1.5).abs() < 1e-5);
        }
    }

    #[test]
    fn circle_3d_without_perpendicular_stays_flat() {
        let points = points_on_circle_3d(Vector3::zero(), 1.0, None, 6).unwrap();
        for p in &points {
            assert!(p.z.abs() < 1e-6);
        }
        // (0, 0, 1) is the already-aligned degenerate case
        let same = points_on_circle_3d(Vector3::zero(), 1.0, Some(Vector3::unit_z()), 6).unwrap();
        for (a, b) in points.iter().zip(&same) {
            assert_vec_near(*a, *b, 1e-6);
        }
    }

    #[test]
    fn circle_3d_handles_antiparallel_perpendicular() {
        let points =
            points_on_circle_3d(Vector3::zero(), 1.0, Some(-Vector3::unit_z()), 4).unwrap();
        for p in &points {
            assert!(p.z.abs() < 1e-5);
            assert!((p.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn axis_angle_round_trip_random() {
        use rand::Rng;
        let mut rng = rand::rng();
        for _ in 0..200 {
            let axis = Vector3::new(
                rng.random_range(-1.0..1.0f32),
                rng.random_range(-1.0..1.0f32),
                rng.random_range(-1.0..1.0f32),
            );
            if axis.magnitude() < 0.1 {
                continue;
            }
            let axis = axis.normalize();
            // keep clear of the 0 and 180 degree ambiguities
            let angle = Deg(rng.random_range(5.0..175.0f32));
            let m = Matrix4::from_axis_angle(axis, angle);

            let got_angle = rotation_angle_from_matrix(&m);
            let got_axis = rotation_axis_from_matrix(&m);
            assert!((got_angle.0 - angle.0).abs() < 1e-2, "angle {:?}", angle);
            // axis parallel up to sign
            assert!(
                got_axis.dot(axis).abs() > 1.0 - 1e-4,
                "axis {:?} vs {:?}",
                got_axis,
                axis
            );
        }
    }

    #[test]
    fn axis_angle_half_turn_special_case() {
        let m = Matrix4::from_axis_angle(Vector3::unit_x(), Deg(180.0));
        let angle = rotation_angle_from_matrix(&m);
        let axis = rotation_axis_from_matrix(&m);
        assert!((angle.0 - 180.0).abs() < 1e-3);
        assert!(axis.dot(Vector3::unit_x()).abs() > 1.0 - 1e-4);

        // off-axis half turn too
        let tilted = Vector3::new(1.0, 1.0, 0.0).normalize();
        let m = Matrix4::from_axis_angle(tilted, Deg(180.0));
        let axis = rotation_axis_from_matrix(&m);
        assert!(axis.dot(tilted).abs() > 1.0 - 1e-3);
    }

    #[test]
    fn identity_maps_to_zero_angle_and_some_unit_axis() {
        let m = Matrix4::identity();
        assert!(rotation_angle_from_matrix(&m).0.abs() < 1e-6);
        // the axis of a zero rotation is underdetermined; only unit length
        // is guaranteed
        let axis = rotation_axis_from_matrix(&m);
        assert!((axis.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn euler_composition_applies_x_then_z_then_y() {
        let x = Deg(30.0);
        let y = Deg(40.0);
        let z = Deg(50.0);
        let m = rotation_from_euler_angles(x, y, z);
        let expected = Matrix4::from_angle_y(y) * Matrix4::from_angle_z(z) * Matrix4::from_angle_x(x);
        for c in 0..4 {
            for r in 0..4 {
                assert!((m[c][r] - expected[c][r]).abs() < 1e-6);
            }
        }
        // and the order genuinely matters
        let swapped = Matrix4::from_angle_x(x) * Matrix4::from_angle_z(z) * Matrix4::from_angle_y(y);
        let p = Vector3::new(1.0, 2.0, 3.0);
        assert!((transform_point(&m, p) - transform_point(&swapped, p)).magnitude() > 1e-3);
    }

    #[test]
    fn composed_transform_matches_explicit_product() {
        let scale = Vector3::new(2.0, 3.0, 4.0);
        let rotation = [Deg(10.0), Deg(20.0), Deg(30.0)];
        let translation = Vector3::new(-1.0, 0.5, 2.0);
        let m = composed_transform(scale, rotation, translation);
        let expected = Matrix4::from_translation(translation)
            * Matrix4::from_angle_x(Deg(10.0))
            * Matrix4::from_angle_z(Deg(30.0))
            * Matrix4::from_angle_y(Deg(20.0))
            * Matrix4::from_nonuniform_scale(2.0, 3.0, 4.0);
        for c in 0..4 {
            for r in 0..4 {
                assert!((m[c][r] - expected[c][r]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn composed_transform_applies_translation_last() {
        let m = composed_transform(
            Vector3::new(2.0, 1.0, 1.0),
            [Deg(0.0), Deg(0.0), Deg(90.0)],
            Vector3::new(10.0, 0.0, 0.0),
        );
        // (1, 0, 0) doubles to (2, 0, 0), rotates onto (0, 2, 0), then the
        // world-space offset lands it at (10, 2, 0)
        let p = transform_point(&m, Vector3::new(1.0, 0.0, 0.0));
        assert!((p - Vector3::new(10.0, 2.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn composed_transform_skips_zero_rotations() {
        let m = composed_transform(
            Vector3::new(1.0, 1.0, 1.0),
            [Deg(0.0), Deg(0.0), Deg(0.0)],
            Vector3::new(1.0, 2.0, 3.0),
        );
        let expected = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        for c in 0..4 {
            for r in 0..4 {
                assert_eq!(m[c][r], expected[c][r]);
            }
        }
    }

    #[test]
    fn rotation_between_degenerate_inputs() {
        assert!(rotation_between(Vector3::zero(), Vector3::unit_x()).is_none());
        let (angle, axis) = rotation_between(Vector3::unit_x(), Vector3::unit_x()).unwrap();
        assert!(angle.0.abs() < 1e-6);
        assert!((axis.magnitude() - 1.0).abs() < 1e-6);
        let (angle, axis) = rotation_between(Vector3::unit_x(), -Vector3::unit_x()).unwrap();
        assert!((angle.0 - std::f32::consts::PI).abs() < 1e-5);
        assert!(axis.dot(Vector3::unit_x()).abs() < 1e-5);
    }
}
