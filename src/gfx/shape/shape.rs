//! The shape type: a set of primitives plus a decomposed model transform.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use cgmath::{Deg, InnerSpace, Matrix4, Rad, SquareMatrix, Vector3};

use crate::animation::{self, AnimationHandle, AnimationTick};
use crate::error::GeometryError;
use crate::gfx::primitive::{Line, Triangle};
use crate::gfx::render_engine::ShapeGpu;
use crate::gfx::surface::SurfaceShared;
use crate::math;

use super::buffers::{RenderBuffers, ShapeColoring};

/// Width assigned when lines first appear on a previously line-less shape.
pub const DEFAULT_LINE_WIDTH: f32 = 10.0;

/// Alignment rotations below this angle (radians) are skipped; the rotation
/// axis would be degenerate.
const ALIGN_EPS: f32 = 1e-4;

/// `place_between_points` treats a direction as "already vertical" when both
/// horizontal components are below this. A small-threshold heuristic, not a
/// principled parallel test; kept from the original behavior.
pub(crate) const VERTICAL_EPS: f32 = 1e-6;

/// One of the three local coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit_vector(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::unit_x(),
            Axis::Y => Vector3::unit_y(),
            Axis::Z => Vector3::unit_z(),
        }
    }

    /// The next axis cyclically; used as the flip axis in [`Shape::align_with`].
    fn orthogonal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }
}

pub(crate) struct ShapeState {
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) lines: Vec<Line>,
    pub(crate) line_width: Option<f32>,
    pub(crate) scaling: Matrix4<f32>,
    pub(crate) rotation: Matrix4<f32>,
    pub(crate) translation: Matrix4<f32>,
    pub(crate) model: Matrix4<f32>,
    pub(crate) buffers: RenderBuffers,
    /// GPU program + buffers; `None` until the render engine compiles the
    /// shape. One-way `Uncompiled -> Compiled`.
    pub(crate) gpu: Option<ShapeGpu>,
    /// Primitive set changed since the last GPU upload.
    pub(crate) gpu_dirty: bool,
    animations: Vec<AnimationHandle>,
}

/// A renderable shape: triangles and/or lines in local coordinates, plus a
/// decomposed model transform (separate scale/rotation/translation
/// matrices, recombined on every setter; scale applies to the local
/// geometry first, then rotation, then translation).
///
/// All operations are mutually exclusive via one per-shape lock; the render
/// path never observes a half-rebuilt model matrix. Shapes are shared as
/// `Arc<Shape>` between a surface and any number of animators; every
/// primitive crossing the public boundary is deep-copied.
pub struct Shape {
    id: String,
    state: Mutex<ShapeState>,
    surface: Mutex<Weak<SurfaceShared>>,
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Shape {
    /// Builds a shape from copies of `triangles` and `lines`; at least one
    /// of the two must be non-empty.
    pub fn new(
        id: impl Into<String>,
        triangles: &[Triangle],
        lines: &[Line],
    ) -> Result<Self, GeometryError> {
        Self::from_parts_vec(id, triangles.to_vec(), lines.to_vec())
    }

    pub fn from_triangles(id: impl Into<String>, triangles: &[Triangle]) -> Result<Self, GeometryError> {
        Self::from_parts_vec(id, triangles.to_vec(), Vec::new())
    }

    pub fn from_lines(id: impl Into<String>, lines: &[Line]) -> Result<Self, GeometryError> {
        Self::from_parts_vec(id, Vec::new(), lines.to_vec())
    }

    /// Move-construction for freshly generated primitives that have never
    /// been shared -- the factory's documented exception to the deep-copy
    /// boundary rule.
    pub(crate) fn from_parts_vec(
        id: impl Into<String>,
        triangles: Vec<Triangle>,
        lines: Vec<Line>,
    ) -> Result<Self, GeometryError> {
        if triangles.is_empty() && lines.is_empty() {
            return Err(GeometryError::EmptyShape);
        }
        let line_width = (!lines.is_empty()).then_some(DEFAULT_LINE_WIDTH);
        let mut buffers = RenderBuffers::default();
        buffers.rebuild(&triangles, &lines);
        Ok(Self {
            id: id.into(),
            state: Mutex::new(ShapeState {
                triangles,
                lines,
                line_width,
                scaling: Matrix4::identity(),
                rotation: Matrix4::identity(),
                translation: Matrix4::identity(),
                model: Matrix4::identity(),
                buffers,
                gpu: None,
                gpu_dirty: false,
                animations: Vec::new(),
            }),
            surface: Mutex::new(Weak::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, ShapeState> {
        self.state.lock().expect("shape state lock poisoned")
    }

    // --- queries ------------------------------------------------------

    /// Deep copies of the triangles.
    pub fn triangles(&self) -> Vec<Triangle> {
        self.state().triangles.clone()
    }

    /// Deep copies of the lines.
    pub fn lines(&self) -> Vec<Line> {
        self.state().lines.clone()
    }

    pub fn triangle_count(&self) -> usize {
        self.state().triangles.len()
    }

    pub fn line_count(&self) -> usize {
        self.state().lines.len()
    }

    /// Line width; meaningful only while the shape has lines.
    pub fn line_width(&self) -> Option<f32> {
        self.state().line_width
    }

    pub fn coloring(&self) -> ShapeColoring {
        self.state().buffers.coloring()
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.state().model
    }

    pub fn scaling_matrix(&self) -> Matrix4<f32> {
        self.state().scaling
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        self.state().rotation
    }

    pub fn translation_matrix(&self) -> Matrix4<f32> {
        self.state().translation
    }

    /// Current world translation (the translation matrix's offset column).
    pub fn translation(&self) -> Vector3<f32> {
        self.state().translation.w.truncate()
    }

    pub fn is_compiled(&self) -> bool {
        self.state().gpu.is_some()
    }

    /// Extent (max minus min vertex coordinate) along local X, before the
    /// model matrix is applied.
    pub fn intrinsic_size_x(&self) -> f32 {
        Self::intrinsic_extent(&self.state(), 0)
    }

    pub fn intrinsic_size_y(&self) -> f32 {
        Self::intrinsic_extent(&self.state(), 1)
    }

    pub fn intrinsic_size_z(&self) -> f32 {
        Self::intrinsic_extent(&self.state(), 2)
    }

    fn intrinsic_extent(state: &ShapeState, axis: usize) -> f32 {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut visit = |v: Vector3<f32>| {
            let c = v[axis];
            min = min.min(c);
            max = max.max(c);
        };
        for t in &state.triangles {
            for v in t.vertices() {
                visit(*v);
            }
        }
        for l in &state.lines {
            visit(l.start());
            visit(l.end());
        }
        if min > max {
            0.0
        } else {
            max - min
        }
    }

    // --- primitive mutation -------------------------------------------

    /// Appends copies of `triangles` and rebuilds the render buffers.
    pub fn add_triangles(&self, triangles: &[Triangle]) -> &Self {
        self.add_triangles_vec(triangles.to_vec());
        self
    }

    pub(crate) fn add_triangles_vec(&self, triangles: Vec<Triangle>) {
        let mut state = self.state();
        state.triangles.extend(triangles);
        Self::primitives_changed(&mut state);
    }

    /// Appends copies of `lines`, assigning the default line width if the
    /// shape had none before, and rebuilds the render buffers.
    pub fn add_lines(&self, lines: &[Line]) -> &Self {
        self.add_lines_vec(lines.to_vec());
        self
    }

    pub(crate) fn add_lines_vec(&self, lines: Vec<Line>) {
        let mut state = self.state();
        state.lines.extend(lines);
        if state.line_width.is_none() && !state.lines.is_empty() {
            state.line_width = Some(DEFAULT_LINE_WIDTH);
        }
        Self::primitives_changed(&mut state);
    }

    /// Removes the primitive (triangle or line) with the given id.
    /// Returns whether anything was removed.
    pub fn remove_primitive(&self, id: &str) -> bool {
        let mut state = self.state();
        let before = state.triangles.len() + state.lines.len();
        state.triangles.retain(|t| t.id() != id);
        state.lines.retain(|l| l.id() != id);
        let removed = state.triangles.len() + state.lines.len() < before;
        if removed {
            Self::primitives_changed(&mut state);
        }
        removed
    }

    pub fn set_line_width(&self, width: f32) -> &Self {
        let mut state = self.state();
        if !state.lines.is_empty() {
            state.line_width = Some(width);
        }
        self
    }

    fn primitives_changed(state: &mut ShapeState) {
        state.buffers.rebuild(&state.triangles, &state.lines);
        state.gpu_dirty = true;
    }

    /// Re-origins local coordinates: `center` becomes the new local origin
    /// by translating every primitive's vertices by `-center`.
    ///
    /// This changes what future rotations rotate around; it does not move
    /// the shape in world space (that is the translation matrix's job).
    pub fn move_center_to(&self, center: Vector3<f32>) -> &Self {
        let mut state = self.state();
        for t in &mut state.triangles {
            t.translate(-center);
        }
        for l in &mut state.lines {
            l.translate(-center);
        }
        Self::primitives_changed(&mut state);
        self
    }

    // --- model transform ----------------------------------------------

    fn rebuild_model(state: &mut ShapeState) {
        // scale first, then rotate, then translate: with column vectors the
        // combined matrix is translation * rotation * scaling
        state.model = state.translation * state.rotation * state.scaling;
    }

    pub fn set_scale(&self, scale: Vector3<f32>) -> &Self {
        let mut state = self.state();
        state.scaling = Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);
        Self::rebuild_model(&mut state);
        self
    }

    pub fn set_scale_x(&self, s: f32) -> &Self {
        let mut state = self.state();
        state.scaling[0][0] = s;
        Self::rebuild_model(&mut state);
        self
    }

    pub fn set_scale_y(&self, s: f32) -> &Self {
        let mut state = self.state();
        state.scaling[1][1] = s;
        Self::rebuild_model(&mut state);
        self
    }

    pub fn set_scale_z(&self, s: f32) -> &Self {
        let mut state = self.state();
        state.scaling[2][2] = s;
        Self::rebuild_model(&mut state);
        self
    }

    /// Replaces the rotation with `angle` about `axis`.
    /// Fails soft on a degenerate axis.
    pub fn set_rotation(&self, angle: Deg<f32>, axis: Vector3<f32>) -> Result<&Self, GeometryError> {
        let axis = math::normalize(axis).ok_or(GeometryError::DegenerateVector)?;
        let mut state = self.state();
        state.rotation = Matrix4::from_axis_angle(axis, angle);
        Self::rebuild_model(&mut state);
        Ok(self)
    }

    /// Replaces the rotation with the Euler composition
    /// [`math::rotation_from_euler_angles`] (X, then Z, then Y).
    pub fn set_rotation_by_euler_angles(&self, x: Deg<f32>, y: Deg<f32>, z: Deg<f32>) -> &Self {
        let mut state = self.state();
        state.rotation = math::rotation_from_euler_angles(x, y, z);
        Self::rebuild_model(&mut state);
        self
    }

    pub fn set_translation(&self, translation: Vector3<f32>) -> &Self {
        let mut state = self.state();
        state.translation = Matrix4::from_translation(translation);
        Self::rebuild_model(&mut state);
        self
    }

    pub fn set_trans_x(&self, t: f32) -> &Self {
        let mut state = self.state();
        state.translation.w.x = t;
        Self::rebuild_model(&mut state);
        self
    }

    pub fn set_trans_y(&self, t: f32) -> &Self {
        let mut state = self.state();
        state.translation.w.y = t;
        Self::rebuild_model(&mut state);
        self
    }

    pub fn set_trans_z(&self, t: f32) -> &Self {
        let mut state = self.state();
        state.translation.w.z = t;
        Self::rebuild_model(&mut state);
        self
    }

    /// Composes an additional rotation about the shape's *current* local X
    /// axis -- the canonical axis pushed through the current rotation
    /// matrix, then left-multiplied onto it (roll/pitch/yaw relative to the
    /// current orientation, not world axes).
    pub fn add_rotation_around_own_x_axis(&self, angle: Deg<f32>) -> &Self {
        let mut state = self.state();
        Self::rotate_around_own_axis(&mut state, Axis::X, angle);
        self
    }

    pub fn add_rotation_around_own_y_axis(&self, angle: Deg<f32>) -> &Self {
        let mut state = self.state();
        Self::rotate_around_own_axis(&mut state, Axis::Y, angle);
        self
    }

    pub fn add_rotation_around_own_z_axis(&self, angle: Deg<f32>) -> &Self {
        let mut state = self.state();
        Self::rotate_around_own_axis(&mut state, Axis::Z, angle);
        self
    }

    fn rotate_around_own_axis(state: &mut ShapeState, axis: Axis, angle: Deg<f32>) {
        let world_axis = (state.rotation * axis.unit_vector().extend(0.0)).truncate();
        // the rotation matrix keeps axes unit-length, but guard anyway
        if let Some(world_axis) = math::normalize(world_axis) {
            state.rotation = Matrix4::from_axis_angle(world_axis, angle) * state.rotation;
            Self::rebuild_model(state);
        }
    }

    /// Rotates the shape so its local `axis` becomes parallel to `vector`.
    ///
    /// The rotation is `acos(dot)` about `cross(axis, v)`; it is skipped
    /// (the rotation matrix reset to identity) when the angle is below
    /// 1e-4 rad, since the rotation axis is degenerate there. `flip` turns
    /// the shape a further 180 degrees about a local axis orthogonal to
    /// `axis` -- whether the alignment points the "wrong way" is the
    /// caller's judgement, not auto-detected. `extra_rotation` applies one
    /// more own-axis rotation afterward.
    pub fn align_with(
        &self,
        axis: Axis,
        vector: Vector3<f32>,
        flip: bool,
        extra_rotation: Option<(Axis, Deg<f32>)>,
    ) -> Result<&Self, GeometryError> {
        let target = math::normalize(vector).ok_or(GeometryError::DegenerateVector)?;
        let axis_vec = axis.unit_vector();

        let mut state = self.state();
        let angle = Rad(axis_vec.dot(target).clamp(-1.0, 1.0).acos());
        if angle.0 < ALIGN_EPS {
            state.rotation = Matrix4::identity();
        } else {
            let rot_axis = axis_vec.cross(target);
            let rot_axis = match math::normalize(rot_axis) {
                Some(a) => a,
                // anti-parallel: any axis orthogonal to `axis` works
                None => axis.orthogonal().unit_vector(),
            };
            state.rotation = Matrix4::from_axis_angle(rot_axis, angle);
        }
        if flip {
            let flip_axis = axis.orthogonal().unit_vector();
            state.rotation = state.rotation * Matrix4::from_axis_angle(flip_axis, Deg(180.0));
        }
        Self::rebuild_model(&mut state);
        if let Some((extra_axis, extra_angle)) = extra_rotation {
            Self::rotate_around_own_axis(&mut state, extra_axis, extra_angle);
        }
        Ok(self)
    }

    /// Places a strut-like shape between two points: scales local Y so the
    /// intrinsic Y extent equals the distance, rotates canonical up
    /// `(0, 1, 0)` onto the p1->p2 direction, and translates the center to
    /// the midpoint.
    ///
    /// The "already vertical" shortcut tests the horizontal components
    /// against a small threshold; a direction pointing straight down also
    /// takes the shortcut (known approximation, kept from the original).
    pub fn place_between_points(
        &self,
        p1: Vector3<f32>,
        p2: Vector3<f32>,
    ) -> Result<&Self, GeometryError> {
        let length = math::distance(p1, p2);
        if length < math::MIN_VECTOR_LENGTH {
            return Err(GeometryError::DegenerateVector);
        }
        let mut state = self.state();
        let extent = Self::intrinsic_extent(&state, 1);
        if extent <= 0.0 {
            return Err(GeometryError::InvalidDimension("intrinsic y extent"));
        }
        let direction = (p2 - p1) / length;

        state.scaling[1][1] = length / extent;
        if direction.x.abs() >= VERTICAL_EPS || direction.z.abs() >= VERTICAL_EPS {
            if let Some((angle, rot_axis)) = math::rotation_between(Vector3::unit_y(), direction) {
                state.rotation = Matrix4::from_axis_angle(rot_axis, angle);
            }
        }
        state.translation = Matrix4::from_translation((p1 + p2) / 2.0);
        Self::rebuild_model(&mut state);
        Ok(self)
    }

    // --- copying ------------------------------------------------------

    /// Independent deep copy: same primitives and transform, no shared
    /// mutable state, detached from any surface, uncompiled.
    pub fn copy(&self, id: impl Into<String>) -> Self {
        let state = self.state();
        Self {
            id: id.into(),
            state: Mutex::new(ShapeState {
                triangles: state.triangles.clone(),
                lines: state.lines.clone(),
                line_width: state.line_width,
                scaling: state.scaling,
                rotation: state.rotation,
                translation: state.translation,
                model: state.model,
                buffers: state.buffers.clone(),
                gpu: None,
                gpu_dirty: false,
                animations: Vec::new(),
            }),
            surface: Mutex::new(Weak::new()),
        }
    }

    // --- surface back-reference ---------------------------------------

    pub(crate) fn attach_surface(&self, surface: Weak<SurfaceShared>) {
        *self.surface.lock().expect("shape surface lock poisoned") = surface;
    }

    pub(crate) fn detach_surface(&self) {
        *self.surface.lock().expect("shape surface lock poisoned") = Weak::new();
    }

    /// Asks the owning surface for a redraw. Safe no-op on a detached
    /// shape.
    pub fn request_redraw(&self) {
        let surface = self.surface.lock().expect("shape surface lock poisoned");
        if let Some(surface) = surface.upgrade() {
            surface.request_redraw();
        }
    }

    // --- animation ----------------------------------------------------

    /// Attaches a repeating-timer animator applying `f` every `period`
    /// until `duration` elapses (if bounded) or the returned handle is
    /// cancelled. See [`crate::animation`].
    pub fn animate<F>(
        self: &Arc<Self>,
        period: Duration,
        duration: Option<Duration>,
        f: F,
    ) -> AnimationHandle
    where
        F: FnMut(&Shape, AnimationTick) + Send + 'static,
    {
        let handle = animation::spawn(Arc::downgrade(self), period, duration, f);
        let mut state = self.state();
        state.animations.retain(|a| !a.is_finished());
        state.animations.push(handle.clone());
        handle
    }

    /// Cancels every animation attached to this shape.
    pub fn cancel_animations(&self) {
        let mut state = self.state();
        for animation in &state.animations {
            animation.cancel();
        }
        state.animations.clear();
    }

    // --- drawing ------------------------------------------------------

    /// Records this shape's draw calls with `mvp = view_projection * model`.
    ///
    /// Must not crash on an uncompiled shape: it logs at trace level and
    /// draws nothing. The per-shape lock is held only while snapshotting
    /// the model matrix and GPU handles, never across the GPU calls.
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        view_projection: Matrix4<f32>,
    ) {
        let (gpu, mvp) = {
            let state = self.state();
            match &state.gpu {
                None => {
                    log::trace!("shape '{}' drawn before compilation; skipping", self.id);
                    return;
                }
                Some(gpu) => (gpu.clone(), view_projection * state.model),
            }
        };
        gpu.draw(queue, pass, mvp);
    }
}
