use glamx::{Mat4, Pose3, Vec2, Vec3, Vec4Swizzles};

/// Trait describing the camera the host renders with.
///
/// The effect only reads from the camera: its world position, its forward
/// direction and its view-projection transform. The host engine owns camera
/// motion, input handling and frustum management.
pub trait RenderCamera {
    /// Returns the camera's position in world space.
    fn eye(&self) -> Vec3;

    /// Returns the camera's view transformation.
    ///
    /// This is the inverse of the camera's world transformation and is used
    /// to transform world coordinates into camera/view space.
    fn view_transform(&self) -> Pose3;

    /// Returns the combined projection and view transformation matrix.
    ///
    /// This matrix transforms points from world coordinates to normalized
    /// device coordinates.
    fn transformation(&self) -> Mat4;

    /// Returns the near and far clipping plane distances.
    fn clip_planes(&self) -> (f32, f32);

    /// The world-space direction the camera is looking toward.
    ///
    /// Derived from the view transform: view space looks down `-Z`, so the
    /// world forward is the inverse rotation applied to `-Z`.
    fn forward(&self) -> Vec3 {
        self.view_transform().rotation.conjugate() * -Vec3::Z
    }

    /// Projects a 3D point in world coordinates to viewport coordinates.
    ///
    /// Viewport coordinates are normalized to `[0, 1]` on both axes with the
    /// origin at the bottom-left corner of the screen. Points outside the
    /// frustum project outside that range; callers decide whether that
    /// matters. A point on the camera plane (`w ≈ 0`) falls back to the
    /// viewport center rather than producing non-finite coordinates.
    fn project_viewport(&self, world_coord: Vec3) -> Vec2 {
        project_viewport(&self.transformation(), world_coord)
    }

    /// Projects a 3D point in world coordinates to 2D screen coordinates.
    ///
    /// # Arguments
    /// * `world_coord` - The 3D point in world space
    /// * `size` - The size of the screen/viewport in pixels
    fn project(&self, world_coord: Vec3, size: Vec2) -> Vec2 {
        self.project_viewport(world_coord) * size
    }
}

/// Projects a world-space point through a view-projection matrix into
/// viewport coordinates in `[0, 1]²`, origin bottom-left.
///
/// A degenerate projection (`w ≈ 0`) yields the viewport center instead of
/// non-finite coordinates.
pub fn project_viewport(proj_view: &Mat4, world_coord: Vec3) -> Vec2 {
    let h_world_coord = world_coord.extend(1.0);
    let h_normalized_coord = *proj_view * h_world_coord;

    if h_normalized_coord.w.abs() <= f32::EPSILON {
        return Vec2::new(0.5, 0.5);
    }

    let normalized_coord = h_normalized_coord.xyz() / h_normalized_coord.w;

    Vec2::new(
        (1.0 + normalized_coord.x) / 2.0,
        (1.0 + normalized_coord.y) / 2.0,
    )
}
