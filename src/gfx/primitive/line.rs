//! Line segments.

use cgmath::{Deg, Vector3};

use crate::error::GeometryError;
use crate::gfx::color::Color;
use crate::math;

/// A colored line segment between two points.
///
/// Immutable by convention: value mutators return copies; only
/// [`Line::transform`] and [`Line::translate`] modify in place, mirroring
/// the triangle contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    id: String,
    start: Vector3<f32>,
    end: Vector3<f32>,
    color: Color,
}

impl Line {
    pub fn new(
        id: impl Into<String>,
        start: Vector3<f32>,
        end: Vector3<f32>,
        color: Color,
    ) -> Result<Self, GeometryError> {
        if !color.is_valid() {
            return Err(GeometryError::InvalidColor);
        }
        Ok(Self {
            id: id.into(),
            start,
            end,
            color,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> Vector3<f32> {
        self.start
    }

    pub fn end(&self) -> Vector3<f32> {
        self.end
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Copy with a different color; fails soft on an invalid color.
    pub fn with_color(&self, color: Color) -> Result<Self, GeometryError> {
        if !color.is_valid() {
            return Err(GeometryError::InvalidColor);
        }
        Ok(Self {
            color,
            ..self.clone()
        })
    }

    /// Copy with different endpoints.
    pub fn with_endpoints(&self, start: Vector3<f32>, end: Vector3<f32>) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }

    /// Bakes an affine transform into both endpoints; same composition as
    /// [`crate::gfx::primitive::Triangle::transform`].
    pub fn transform(
        &mut self,
        scale: Vector3<f32>,
        rotation: [Deg<f32>; 3],
        translation: Vector3<f32>,
    ) {
        let m = math::composed_transform(scale, rotation, translation);
        self.start = math::transform_point(&m, self.start);
        self.end = math::transform_point(&m, self.end);
    }

    /// Shifts both endpoints by `offset`.
    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.start += offset;
        self.end += offset;
    }

    /// Deep copy under a new id.
    pub fn copy(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }

    /// Segment length.
    pub fn length(&self) -> f32 {
        math::distance(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Zero};

    #[test]
    fn rejects_invalid_color() {
        let bad = Line::new(
            "l",
            Vector3::zero(),
            Vector3::unit_x(),
            Color::new(0.0, 0.0, -0.5, 1.0),
        );
        assert_eq!(bad.unwrap_err(), GeometryError::InvalidColor);
    }

    #[test]
    fn with_color_returns_a_copy() {
        let line = Line::new("l", Vector3::zero(), Vector3::unit_x(), Color::WHITE).unwrap();
        let red = line.with_color(Color::RED).unwrap();
        assert_eq!(line.color(), Color::WHITE);
        assert_eq!(red.color(), Color::RED);
        assert_eq!(red.start(), line.start());
    }

    #[test]
    fn transform_rotates_endpoints() {
        let mut line = Line::new("l", Vector3::zero(), Vector3::unit_x(), Color::WHITE).unwrap();
        line.transform(
            Vector3::new(1.0, 1.0, 1.0),
            [Deg(0.0), Deg(90.0), Deg(0.0)],
            Vector3::zero(),
        );
        // +X rotated 90 degrees about Y lands on -Z
        assert!((line.end() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
        assert!((line.length() - 1.0).abs() < 1e-6);
    }
}
