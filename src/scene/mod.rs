//! Occluder geometry handed over by the host's visibility system.
//!
//! The effect does not walk a scene graph and does not cull. Each frame the
//! host provides a [`VisibleSet`]: the opaque instances that survived its own
//! culling for the current camera. Only positions matter here: the occluder
//! override stage is unlit, so normals, UVs and materials never reach the
//! silhouette mask.

use crate::context::Context;
use glamx::{Mat4, Pose3, Vec3};
use std::rc::Rc;

/// Triangle geometry for the occluder mask, stored on the GPU.
///
/// Positions and indices only; created once, shared between instances via
/// `Rc`.
pub struct OccluderMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
}

impl OccluderMesh {
    /// Uploads mesh data to the GPU.
    ///
    /// # Arguments
    /// * `coords` - Vertex positions
    /// * `faces` - Triangle faces as indices into `coords`
    pub fn new(coords: Vec<Vec3>, faces: Vec<[u32; 3]>) -> OccluderMesh {
        let ctxt = Context::get();

        let vertex_buffer = ctxt.create_buffer_init(
            Some("occluder_mesh_vertices"),
            bytemuck::cast_slice(&coords),
            wgpu::BufferUsages::VERTEX,
        );

        let index_buffer = ctxt.create_buffer_init(
            Some("occluder_mesh_indices"),
            bytemuck::cast_slice(&faces),
            wgpu::BufferUsages::INDEX,
        );

        OccluderMesh {
            vertex_buffer,
            index_buffer,
            num_indices: faces.len() as u32 * 3,
        }
    }

    /// The vertex buffer (positions, `Float32x3`).
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    /// The index buffer (`Uint32` triangle list).
    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    /// The number of indices to draw.
    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }
}

/// One visible opaque object: shared geometry plus its world transform.
pub struct OccluderInstance {
    /// The geometry to rasterize.
    pub mesh: Rc<OccluderMesh>,
    /// World-space pose of the instance.
    pub pose: Pose3,
    /// Non-uniform scale applied before the pose.
    pub scale: Vec3,
}

impl OccluderInstance {
    /// Creates an unscaled instance of a mesh.
    pub fn new(mesh: Rc<OccluderMesh>, pose: Pose3) -> OccluderInstance {
        OccluderInstance {
            mesh,
            pose,
            scale: Vec3::ONE,
        }
    }

    /// Sets the instance scale.
    pub fn with_scale(mut self, scale: Vec3) -> OccluderInstance {
        self.scale = scale;
        self
    }

    /// The world-space model matrix for this instance.
    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(&self.pose, self.scale)
    }
}

/// Composes a pose and a scale into a model matrix (scale first).
pub fn model_matrix(pose: &Pose3, scale: Vec3) -> Mat4 {
    pose.to_mat4() * Mat4::from_scale(scale)
}

/// The opaque instances visible to the current camera, as produced by the
/// host's visibility/culling system for one frame.
#[derive(Default)]
pub struct VisibleSet {
    instances: Vec<OccluderInstance>,
}

impl VisibleSet {
    /// Creates an empty set.
    pub fn new() -> VisibleSet {
        VisibleSet::default()
    }

    /// Adds an instance to the set.
    pub fn push(&mut self, instance: OccluderInstance) {
        self.instances.push(instance);
    }

    /// Iterates over the visible instances.
    pub fn iter(&self) -> impl Iterator<Item = &OccluderInstance> {
        self.instances.iter()
    }

    /// The number of visible instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Clears the set for the next frame.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_matrix_applies_scale_before_pose() {
        let mut pose = Pose3::IDENTITY;
        pose.translation = Vec3::new(10.0, 0.0, 0.0);
        let m = model_matrix(&pose, Vec3::splat(2.0));

        let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-5, "got {:?}", p);
    }
}
