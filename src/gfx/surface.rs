//! # Surface View
//!
//! The surface owns the set of shapes to draw and the camera, and receives
//! the host's lifecycle callbacks (created, resized, draw frame).
//!
//! Locking: the shape list has its own lock, distinct from each shape's
//! lock, because shapes can be added or removed while a frame is being
//! drawn. List accessors hand out defensive copies so iteration during
//! drawing is never invalidated by a concurrent add/remove. Shapes hold
//! only a weak back-reference to the surface, used to flag redraw requests
//! -- never for ownership or lifetime decisions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cgmath::{Matrix4, Vector3};

use crate::gfx::camera::Camera;
use crate::gfx::render_engine::RenderEngine;
use crate::gfx::shape::Shape;

pub(crate) struct SurfaceShared {
    shapes: Mutex<Vec<Arc<Shape>>>,
    camera: Mutex<Camera>,
    redraw: AtomicBool,
}

impl SurfaceShared {
    pub(crate) fn request_redraw(&self) {
        self.redraw.store(true, Ordering::Relaxed);
    }
}

/// Handle to a shared surface; clones refer to the same surface.
#[derive(Clone)]
pub struct Surface {
    shared: Arc<SurfaceShared>,
}

impl Surface {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(SurfaceShared {
                shapes: Mutex::new(Vec::new()),
                camera: Mutex::new(Camera::new()),
                redraw: AtomicBool::new(true),
            }),
        }
    }

    fn shape_list(&self) -> std::sync::MutexGuard<'_, Vec<Arc<Shape>>> {
        self.shared.shapes.lock().expect("surface shape list lock poisoned")
    }

    fn camera(&self) -> std::sync::MutexGuard<'_, Camera> {
        self.shared.camera.lock().expect("surface camera lock poisoned")
    }

    /// Registers a shape for drawing and wires its redraw back-reference.
    pub fn add_shape(&self, shape: Arc<Shape>) {
        shape.attach_surface(Arc::downgrade(&self.shared));
        self.shape_list().push(shape);
        self.shared.request_redraw();
    }

    /// Unregisters the shape with the given id and detaches it. The shape
    /// itself stays valid: a live animator may still tick it safely.
    pub fn remove_shape(&self, id: &str) -> Option<Arc<Shape>> {
        let mut shapes = self.shape_list();
        let index = shapes.iter().position(|s| s.id() == id)?;
        let shape = shapes.remove(index);
        drop(shapes);
        shape.detach_surface();
        self.shared.request_redraw();
        Some(shape)
    }

    /// Defensive copy of the registered shapes, safe to iterate while
    /// other threads add or remove.
    pub fn shapes(&self) -> Vec<Arc<Shape>> {
        self.shape_list().clone()
    }

    pub fn shape(&self, id: &str) -> Option<Arc<Shape>> {
        self.shape_list().iter().find(|s| s.id() == id).cloned()
    }

    pub fn shape_count(&self) -> usize {
        self.shape_list().len()
    }

    /// Recomputes the view matrix via look-at with the fixed up vector
    /// `(0, 1, 0)`, then the combined view-projection.
    pub fn set_view_matrix(&self, eye: Vector3<f32>, center: Vector3<f32>) {
        self.camera().set_view(eye, center);
        self.shared.request_redraw();
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.camera().view_projection()
    }

    pub fn request_redraw(&self) {
        self.shared.request_redraw();
    }

    /// Consumes a pending redraw request, if any. The app shell polls this
    /// to decide whether to schedule a frame.
    pub fn take_redraw_request(&self) -> bool {
        self.shared.redraw.swap(false, Ordering::Relaxed)
    }

    /// Host callback: the rendering surface exists; compile the GPU
    /// program of every registered shape.
    pub fn on_surface_created(&self, engine: &RenderEngine) {
        for shape in self.shapes() {
            engine.compile_shape(&shape);
        }
    }

    /// Host callback: surface dimensions changed; recompute the projection
    /// matrix from the new aspect ratio (fixed near/far of 1/1000).
    pub fn on_surface_resized(&self, width: u32, height: u32) {
        self.camera().resize(width, height);
        self.shared.request_redraw();
    }

    /// Host callback: draw one frame. Every registered shape is compiled
    /// if needed (first frame, or its primitive set changed), then drawn
    /// with the current view-projection matrix.
    pub fn on_draw_frame(&self, engine: &RenderEngine) -> anyhow::Result<()> {
        let view_projection = self.view_projection();
        let shapes = self.shapes();
        engine.render_frame(|queue, pass| {
            for shape in &shapes {
                engine.compile_shape(shape);
                shape.draw(queue, pass, view_projection);
            }
        })
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}
