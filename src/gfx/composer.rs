//! # Scene Composition
//!
//! Placement of shape collections into world positions: equidistant points
//! along a line, around a circle, or filling a 3D occupancy grid. Each
//! placement comes in a synchronous flavor (set the translation now) and an
//! animated one (hand placement to an animator that interpolates from the
//! shape's current position to its target over a duration).

use std::sync::Arc;
use std::time::Duration;

use cgmath::Vector3;

use crate::animation::AnimationHandle;
use crate::error::GeometryError;
use crate::gfx::shape::Shape;
use crate::math;

/// Tick period of animated placements, roughly one frame at 60 Hz.
const PLACEMENT_TICK: Duration = Duration::from_millis(16);

/// `n` equidistant points from `start` to `end`, endpoints included.
/// A single point lands on the segment midpoint.
pub fn positions_on_line(start: Vector3<f32>, end: Vector3<f32>, n: usize) -> Vec<Vector3<f32>> {
    match n {
        0 => Vec::new(),
        1 => vec![(start + end) / 2.0],
        _ => (0..n)
            .map(|i| start + (end - start) * (i as f32 / (n - 1) as f32))
            .collect(),
    }
}

/// `n` equidistant points on a circle; see
/// [`math::points_on_circle_3d`] for orientation conventions.
pub fn positions_on_circle(
    center: Vector3<f32>,
    radius: f32,
    perpendicular: Option<Vector3<f32>>,
    n: usize,
) -> Result<Vec<Vector3<f32>>, GeometryError> {
    if radius <= 0.0 {
        return Err(GeometryError::InvalidDimension("circle radius"));
    }
    if n == 0 {
        return Err(GeometryError::InvalidCount("circle placement needs at least one point"));
    }
    math::points_on_circle_3d(center, radius, perpendicular, n)
        .ok_or(GeometryError::DegenerateVector)
}

/// Points of an `nx * ny * nz` occupancy grid starting at `origin`,
/// advancing fastest along X, then Y, then Z.
pub fn positions_in_grid(
    origin: Vector3<f32>,
    spacing: Vector3<f32>,
    counts: (usize, usize, usize),
) -> Vec<Vector3<f32>> {
    let (nx, ny, nz) = counts;
    let mut positions = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                positions.push(
                    origin
                        + Vector3::new(
                            i as f32 * spacing.x,
                            j as f32 * spacing.y,
                            k as f32 * spacing.z,
                        ),
                );
            }
        }
    }
    positions
}

/// Distributes `shapes` along the segment from `start` to `end`.
///
/// Without `animation` each shape's translation is set synchronously and
/// the result is empty. With a duration, each shape starts where it
/// currently is and animates toward its target; the returned handles can
/// cancel the moves.
pub fn place_on_line(
    shapes: &[Arc<Shape>],
    start: Vector3<f32>,
    end: Vector3<f32>,
    animation: Option<Duration>,
) -> Vec<AnimationHandle> {
    let positions = positions_on_line(start, end, shapes.len());
    place_at_positions(shapes, &positions, animation)
}

/// Distributes `shapes` around a circle.
pub fn place_on_circle(
    shapes: &[Arc<Shape>],
    center: Vector3<f32>,
    radius: f32,
    perpendicular: Option<Vector3<f32>>,
    animation: Option<Duration>,
) -> Result<Vec<AnimationHandle>, GeometryError> {
    if shapes.is_empty() {
        return Ok(Vec::new());
    }
    let positions = positions_on_circle(center, radius, perpendicular, shapes.len())?;
    Ok(place_at_positions(shapes, &positions, animation))
}

/// Fills a grid with `shapes` in order; shapes beyond the grid's capacity
/// are left where they are.
pub fn place_in_grid(
    shapes: &[Arc<Shape>],
    origin: Vector3<f32>,
    spacing: Vector3<f32>,
    counts: (usize, usize, usize),
    animation: Option<Duration>,
) -> Vec<AnimationHandle> {
    let positions = positions_in_grid(origin, spacing, counts);
    place_at_positions(shapes, &positions, animation)
}

fn place_at_positions(
    shapes: &[Arc<Shape>],
    positions: &[Vector3<f32>],
    animation: Option<Duration>,
) -> Vec<AnimationHandle> {
    let mut handles = Vec::new();
    for (shape, target) in shapes.iter().zip(positions.iter().copied()) {
        match animation {
            None => {
                shape.set_translation(target);
            }
            Some(duration) => {
                let from = shape.translation();
                handles.push(shape.animate(
                    PLACEMENT_TICK,
                    Some(duration),
                    move |shape, tick| {
                        let t = tick.progress.unwrap_or(1.0).min(1.0);
                        shape.set_translation(from + (target - from) * t);
                    },
                ));
            }
        }
    }
    handles
}
