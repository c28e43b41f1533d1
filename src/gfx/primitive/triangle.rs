//! Triangles and their coloring modes.

use cgmath::{Deg, Vector3};

use crate::error::GeometryError;
use crate::gfx::color::Color;
use crate::math;

use super::TextureHandle;

/// How a triangle's pixels get their color.
///
/// Exactly one mode is active at a time; setting a mode replaces whatever
/// was there before. There is no undefined state.
#[derive(Debug, Clone, PartialEq)]
pub enum Coloring {
    /// One color across the whole face.
    Uniform(Color),
    /// One color per vertex, interpolated across the face.
    Gradient([Color; 3]),
    /// A host-registered texture sampled at the given UV coordinates
    /// (two floats per vertex).
    Textured {
        texture: TextureHandle,
        uvs: [f32; 6],
    },
}

/// A single triangle: three vertices and one coloring mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    id: String,
    vertices: [Vector3<f32>; 3],
    coloring: Coloring,
}

impl Triangle {
    pub fn new(id: impl Into<String>, vertices: [Vector3<f32>; 3], coloring: Coloring) -> Self {
        Self {
            id: id.into(),
            vertices,
            coloring,
        }
    }

    /// Uniformly colored triangle; fails on an out-of-range color.
    pub fn uniform(
        id: impl Into<String>,
        vertices: [Vector3<f32>; 3],
        color: Color,
    ) -> Result<Self, GeometryError> {
        if !color.is_valid() {
            return Err(GeometryError::InvalidColor);
        }
        Ok(Self::new(id, vertices, Coloring::Uniform(color)))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vertices(&self) -> &[Vector3<f32>; 3] {
        &self.vertices
    }

    pub fn coloring(&self) -> &Coloring {
        &self.coloring
    }

    /// Switches to uniform coloring, replacing any gradient or texture.
    pub fn set_uniform_color(&mut self, color: Color) -> Result<(), GeometryError> {
        if !color.is_valid() {
            return Err(GeometryError::InvalidColor);
        }
        self.coloring = Coloring::Uniform(color);
        Ok(())
    }

    /// Switches to per-vertex gradient coloring.
    pub fn set_vertex_colors(&mut self, colors: [Color; 3]) -> Result<(), GeometryError> {
        if !crate::gfx::color::is_valid_colors(&colors) {
            return Err(GeometryError::InvalidColor);
        }
        self.coloring = Coloring::Gradient(colors);
        Ok(())
    }

    /// Switches to textured coloring.
    pub fn set_texture(&mut self, texture: TextureHandle, uvs: [f32; 6]) {
        self.coloring = Coloring::Textured { texture, uvs };
    }

    /// The uniform color, if that mode is active.
    pub fn uniform_color(&self) -> Option<Color> {
        match self.coloring {
            Coloring::Uniform(c) => Some(c),
            _ => None,
        }
    }

    /// The per-vertex colors, if gradient mode is active.
    pub fn vertex_colors(&self) -> Option<&[Color; 3]> {
        match &self.coloring {
            Coloring::Gradient(colors) => Some(colors),
            _ => None,
        }
    }

    /// The texture and UVs, if textured mode is active.
    pub fn texture(&self) -> Option<(TextureHandle, &[f32; 6])> {
        match &self.coloring {
            Coloring::Textured { texture, uvs } => Some((*texture, uvs)),
            _ => None,
        }
    }

    /// Bakes an affine transform into the vertices: scale, then the Y, Z
    /// and X rotations, then translate; see [`math::composed_transform`]
    /// for the exact composition rules.
    pub fn transform(
        &mut self,
        scale: Vector3<f32>,
        rotation: [Deg<f32>; 3],
        translation: Vector3<f32>,
    ) {
        let m = math::composed_transform(scale, rotation, translation);
        for v in &mut self.vertices {
            *v = math::transform_point(&m, *v);
        }
    }

    /// Shifts every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f32>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Projects every vertex onto the unit sphere (sphere construction).
    ///
    /// Fails if any vertex is too close to the origin to have a direction.
    pub fn normalize_vertices(&mut self) -> Result<(), GeometryError> {
        let mut normalized = self.vertices;
        for v in &mut normalized {
            *v = math::normalize(*v).ok_or(GeometryError::DegenerateVector)?;
        }
        self.vertices = normalized;
        Ok(())
    }

    /// Deep copy under a new id.
    pub fn copy(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vertices: self.vertices,
            coloring: self.coloring.clone(),
        }
    }

    /// Face centroid.
    pub fn centroid(&self) -> Vector3<f32> {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// Outward face normal (right-hand rule over the vertex order), or
    /// `None` for a degenerate triangle.
    pub fn normal(&self) -> Option<Vector3<f32>> {
        let edge1 = self.vertices[1] - self.vertices[0];
        let edge2 = self.vertices[2] - self.vertices[0];
        math::normalize(edge1.cross(edge2))
    }
}
