//! Camera: look-at view matrix combined with a perspective projection.

use cgmath::{perspective, Deg, EuclideanSpace, Matrix4, Point3, SquareMatrix, Vector3};

/// Maps OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1]).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Fixed camera up vector; the view API deliberately has no roll.
const UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

const FOVY: Deg<f32> = Deg(45.0);
const ZNEAR: f32 = 1.0;
const ZFAR: f32 = 1000.0;

/// View-projection state for one surface.
///
/// The view matrix comes from `look_at` with the fixed up vector; the
/// projection from a 45 degree perspective with near/far fixed at 1/1000.
/// Both recombine into a cached view-projection whenever either changes.
pub struct Camera {
    eye: Vector3<f32>,
    center: Vector3<f32>,
    aspect: f32,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    view_projection: Matrix4<f32>,
}

impl Camera {
    pub fn new() -> Self {
        let mut camera = Self {
            eye: Vector3::new(0.0, 2.0, 6.0),
            center: Vector3::new(0.0, 0.0, 0.0),
            aspect: 1.0,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            view_projection: Matrix4::identity(),
        };
        camera.rebuild_view();
        camera.rebuild_projection();
        camera
    }

    /// Recomputes the view matrix from eye and look-at center, then the
    /// combined view-projection.
    pub fn set_view(&mut self, eye: Vector3<f32>, center: Vector3<f32>) {
        self.eye = eye;
        self.center = center;
        self.rebuild_view();
    }

    /// Recomputes the projection for a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.rebuild_projection();
    }

    pub fn eye(&self) -> Vector3<f32> {
        self.eye
    }

    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.view_projection
    }

    fn rebuild_view(&mut self) {
        self.view = Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.center),
            UP,
        );
        self.recombine();
    }

    fn rebuild_projection(&mut self) {
        self.projection = OPENGL_TO_WGPU_MATRIX * perspective(FOVY, self.aspect, ZNEAR, ZFAR);
        self.recombine();
    }

    fn recombine(&mut self) {
        self.view_projection = self.projection * self.view;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_looks_down_the_eye_to_center_axis() {
        let mut camera = Camera::new();
        camera.set_view(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 0.0));
        camera.resize(800, 600);
        // a point at the center projects to the middle of the screen
        let clip = camera.view_projection() * Vector3::new(0.0, 0.0, 0.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn view_projection_is_projection_times_view() {
        let mut camera = Camera::new();
        camera.resize(1200, 800);
        camera.set_view(Vector3::new(3.0, 4.0, 5.0), Vector3::new(0.0, 1.0, 0.0));
        let expected = OPENGL_TO_WGPU_MATRIX
            * perspective(Deg(45.0), 1.5, 1.0, 1000.0)
            * Matrix4::look_at_rh(
                Point3::new(3.0, 4.0, 5.0),
                Point3::new(0.0, 1.0, 0.0),
                Vector3::unit_y(),
            );
        for c in 0..4 {
            for r in 0..4 {
                assert!((camera.view_projection()[c][r] - expected[c][r]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut camera = Camera::new();
        camera.resize(800, 600);
        let before = camera.view_projection();
        camera.resize(0, 600);
        let after = camera.view_projection();
        for c in 0..4 {
            for r in 0..4 {
                assert_eq!(before[c][r], after[c][r]);
            }
        }
    }

    #[test]
    fn points_behind_the_camera_do_not_project_forward() {
        let mut camera = Camera::new();
        camera.resize(100, 100);
        camera.set_view(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 0.0));
        let in_front = camera.view_projection() * Vector3::new(0.0, 0.0, 0.0).extend(1.0);
        let behind = camera.view_projection() * Vector3::new(0.0, 0.0, 10.0).extend(1.0);
        assert!(in_front.w > 0.0);
        assert!(behind.w < 0.0);
    }
}
