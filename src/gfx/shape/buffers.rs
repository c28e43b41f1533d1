//! CPU-side render buffer caches.
//!
//! A shape keeps flat position/color/UV arrays derived from its primitive
//! set, rebuilt whenever that set changes (never per draw). The render
//! engine uploads them verbatim when it compiles the shape.

use crate::gfx::primitive::{Coloring, Line, TextureHandle, Triangle};

/// Which of the two fixed shader programs a shape needs.
///
/// Derived from the triangles' coloring mode; uniform and gradient coloring
/// share the per-vertex-color program. Coloring is assumed uniform across a
/// shape's triangles (not enforced); a shape with only lines is
/// vertex-colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeColoring {
    VertexColor,
    Textured,
}

/// Flat vertex streams for one shape, ready for GPU upload.
#[derive(Debug, Default, Clone)]
pub(crate) struct RenderBuffers {
    /// Triangle vertex positions, 3 floats per vertex.
    pub triangle_positions: Vec<f32>,
    /// Per-vertex RGBA, 4 floats per vertex; empty for textured shapes.
    pub triangle_colors: Vec<f32>,
    /// Per-vertex UVs, 2 floats per vertex; empty for vertex-colored shapes.
    pub triangle_uvs: Vec<f32>,
    /// Consecutive runs of triangles sharing one texture, as
    /// (handle, vertex count). One draw call per run.
    pub texture_runs: Vec<(TextureHandle, u32)>,
    /// Line endpoint positions, 3 floats per vertex.
    pub line_positions: Vec<f32>,
    /// Line endpoint RGBA, 4 floats per vertex.
    pub line_colors: Vec<f32>,
}

impl RenderBuffers {
    pub fn coloring(&self) -> ShapeColoring {
        if self.texture_runs.is_empty() {
            ShapeColoring::VertexColor
        } else {
            ShapeColoring::Textured
        }
    }

    pub fn triangle_vertex_count(&self) -> u32 {
        (self.triangle_positions.len() / 3) as u32
    }

    pub fn line_vertex_count(&self) -> u32 {
        (self.line_positions.len() / 3) as u32
    }

    /// Rebuilds every stream from the primitive set.
    pub fn rebuild(&mut self, triangles: &[Triangle], lines: &[Line]) {
        self.triangle_positions.clear();
        self.triangle_colors.clear();
        self.triangle_uvs.clear();
        self.texture_runs.clear();
        self.line_positions.clear();
        self.line_colors.clear();

        let textured = matches!(
            triangles.first().map(Triangle::coloring),
            Some(Coloring::Textured { .. })
        );

        for triangle in triangles {
            for v in triangle.vertices() {
                self.triangle_positions.extend_from_slice(&[v.x, v.y, v.z]);
            }
            match triangle.coloring() {
                Coloring::Uniform(c) => {
                    for _ in 0..3 {
                        self.triangle_colors.extend_from_slice(&c.to_array());
                    }
                }
                Coloring::Gradient(colors) => {
                    for c in colors {
                        self.triangle_colors.extend_from_slice(&c.to_array());
                    }
                }
                Coloring::Textured { texture, uvs } => {
                    self.triangle_uvs.extend_from_slice(uvs);
                    match self.texture_runs.last_mut() {
                        Some((handle, count)) if handle == texture => *count += 3,
                        _ => self.texture_runs.push((*texture, 3)),
                    }
                }
            }
        }

        // A nominally textured shape carrying stray vertex-colored
        // triangles would desync the UV stream from the position stream;
        // pad so the upload stays well-formed.
        if textured {
            let expected = (self.triangle_positions.len() / 3) * 2;
            if self.triangle_uvs.len() < expected {
                self.triangle_uvs.resize(expected, 0.0);
            }
        }

        for line in lines {
            let (s, e) = (line.start(), line.end());
            self.line_positions.extend_from_slice(&[s.x, s.y, s.z]);
            self.line_positions.extend_from_slice(&[e.x, e.y, e.z]);
            let rgba = line.color().to_array();
            self.line_colors.extend_from_slice(&rgba);
            self.line_colors.extend_from_slice(&rgba);
        }
    }
}
