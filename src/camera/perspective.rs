use crate::camera::RenderCamera;
use glamx::{Mat4, Pose3, Vec2, Vec3};
use std::f32;

/// A simple perspective camera with an explicit eye and look-at target.
///
/// This is the reference [`RenderCamera`] implementation: hosts with their
/// own camera system implement the trait directly on it instead.
///
/// # Example
/// ```
/// # use sunshafts::prelude::*;
/// let mut camera = PerspectiveCamera::new(
///     Vec3::new(0.0, 1.0, 5.0),  // Eye position
///     Vec3::ZERO                 // Looking at origin
/// );
/// camera.set_viewport(1920.0, 1080.0);
/// ```
#[derive(Copy, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerspectiveCamera {
    eye: Vec3,
    at: Vec3,
    up_axis: Vec3,

    fov: f32,
    znear: f32,
    zfar: f32,
    proj: Mat4,
    view: Mat4,
    proj_view: Mat4,
    viewport_size: Vec2,
}

impl PerspectiveCamera {
    /// Creates a new perspective camera with default frustum settings.
    ///
    /// Default frustum: 45° field of view, near plane at 0.1, far plane at 1024.
    ///
    /// # Arguments
    /// * `eye` - Camera position
    /// * `at` - Point to look at
    pub fn new(eye: Vec3, at: Vec3) -> PerspectiveCamera {
        PerspectiveCamera::new_with_frustum(f32::consts::PI / 4.0, 0.1, 1024.0, eye, at)
    }

    /// Creates a new perspective camera with custom frustum parameters.
    ///
    /// # Arguments
    /// * `fov` - Field of view in radians
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    /// * `eye` - Camera position
    /// * `at` - Point to look at
    pub fn new_with_frustum(
        fov: f32,
        znear: f32,
        zfar: f32,
        eye: Vec3,
        at: Vec3,
    ) -> PerspectiveCamera {
        let mut res = PerspectiveCamera {
            eye,
            at,
            up_axis: Vec3::Y,
            fov,
            znear,
            zfar,
            proj: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            proj_view: Mat4::IDENTITY,
            viewport_size: Vec2::new(800.0, 600.0),
        };

        res.update_projviews();
        res
    }

    /// Changes the orientation and position of the camera to look at the specified point.
    pub fn look_at(&mut self, eye: Vec3, at: Vec3) {
        self.eye = eye;
        self.at = at;
        self.update_projviews();
    }

    /// The point the camera is looking at.
    pub fn at(&self) -> Vec3 {
        self.at
    }

    /// Sets the up-axis of this camera.
    pub fn set_up_axis(&mut self, up_axis: Vec3) {
        self.up_axis = up_axis.normalize();
        self.update_projviews();
    }

    /// Sets the viewport dimensions in pixels, updating the aspect ratio.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_size = Vec2::new(width, height);
        self.update_projviews();
    }

    /// The viewport dimensions in pixels.
    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    fn update_projviews(&mut self) {
        self.view = self.view_transform().to_mat4();
        let aspect = self.viewport_size.x / self.viewport_size.y;
        self.proj = Mat4::perspective_rh_gl(self.fov, aspect, self.znear, self.zfar);
        self.proj_view = self.proj * self.view;
    }
}

impl RenderCamera for PerspectiveCamera {
    fn eye(&self) -> Vec3 {
        self.eye
    }

    fn view_transform(&self) -> Pose3 {
        Pose3::look_at_rh(self.eye, self.at, self.up_axis)
    }

    fn transformation(&self) -> Mat4 {
        self.proj_view
    }

    fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_matches_look_direction() {
        let camera = PerspectiveCamera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, -4.0));
        let fwd = camera.forward();
        assert!((fwd - Vec3::NEG_Z).length() < 1e-5, "got {:?}", fwd);
    }

    #[test]
    fn point_ahead_projects_to_viewport_center() {
        let camera = PerspectiveCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let center = camera.project_viewport(Vec3::new(0.0, 0.0, -10.0));
        assert!((center.x - 0.5).abs() < 1e-5);
        assert!((center.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn point_right_of_view_projects_right_of_center() {
        let camera = PerspectiveCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let p = camera.project_viewport(Vec3::new(1.0, 0.0, -10.0));
        assert!(p.x > 0.5);
        assert!((p.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn point_above_view_projects_above_center() {
        // Viewport origin is bottom-left, so "above" means y > 0.5.
        let camera = PerspectiveCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let p = camera.project_viewport(Vec3::new(0.0, 1.0, -10.0));
        assert!(p.y > 0.5);
    }

    #[test]
    fn degenerate_projection_falls_back_to_center() {
        // A point exactly on the camera plane projects with w == 0.
        let camera = PerspectiveCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let p = camera.project_viewport(Vec3::new(3.0, -2.0, 0.0));
        assert!(p.x.is_finite() && p.y.is_finite());
        assert!((p - Vec2::new(0.5, 0.5)).length() < 1e-6);
    }

    #[test]
    fn project_scales_viewport_to_pixels() {
        let camera = PerspectiveCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let p = camera.project(Vec3::new(0.0, 0.0, -5.0), Vec2::new(1920.0, 1080.0));
        assert!((p.x - 960.0).abs() < 1e-2);
        assert!((p.y - 540.0).abs() < 1e-2);
    }
}
