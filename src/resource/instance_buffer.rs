//! Per-instance uniform buffer for the occluder draws.
//!
//! Every visible opaque instance needs its model matrix bound while the
//! occluder pass rasterizes it. Writing one tiny buffer per instance would
//! cost a `write_buffer` call each; instead the matrices are accumulated in
//! CPU memory and flushed to a single GPU buffer, with each entry aligned so
//! it can be selected through a dynamic bind-group offset.

use crate::context::Context;
use bytemuck::{Pod, Zeroable};
use std::mem;

/// Per-instance uniforms for the occluder override stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceUniforms {
    /// World-space model matrix (pose and scale combined).
    pub model: [[f32; 4]; 4],
}

/// A dynamic-offset uniform buffer holding one [`InstanceUniforms`] entry per
/// visible occluder instance.
///
/// # Usage
///
/// ```ignore
/// buffer.clear();
/// let offsets: Vec<u32> = visible.iter().map(|i| buffer.push(&uniforms_for(i))).collect();
/// buffer.flush(); // single GPU write
/// // render using the stored offsets
/// ```
pub struct InstanceBuffer {
    /// CPU-side accumulator for this frame's entries.
    data: Vec<u8>,
    /// GPU buffer.
    buffer: wgpu::Buffer,
    /// Current capacity in bytes.
    capacity: u64,
    /// Size of each entry, aligned to the device's uniform offset alignment.
    aligned_size: u64,
    /// Number of entries currently in the buffer.
    count: usize,
}

impl InstanceBuffer {
    /// Creates a new instance buffer with a default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Creates a new instance buffer sized for `initial_capacity` entries.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        let ctxt = Context::get();
        let alignment = ctxt.device.limits().min_uniform_buffer_offset_alignment as u64;

        let unaligned_size = mem::size_of::<InstanceUniforms>() as u64;
        let aligned_size = unaligned_size.div_ceil(alignment) * alignment;

        let capacity = aligned_size * initial_capacity as u64;

        let buffer = ctxt.create_buffer_simple(
            Some("occluder_instance_uniforms"),
            capacity,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        Self {
            data: Vec::with_capacity(capacity as usize),
            buffer,
            capacity,
            aligned_size,
            count: 0,
        }
    }

    /// Returns the aligned size of each entry.
    #[inline]
    pub fn aligned_size(&self) -> u64 {
        self.aligned_size
    }

    /// Returns the number of entries currently in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the buffer contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Clears the buffer for the next frame without deallocating.
    pub fn clear(&mut self) {
        self.data.clear();
        self.count = 0;
    }

    /// Pushes an instance entry and returns its byte offset in the buffer.
    ///
    /// The offset selects this entry through a dynamic bind-group offset.
    /// `flush()` must run after all pushes and before rendering.
    pub fn push(&mut self, value: &InstanceUniforms) -> u32 {
        let offset = (self.count as u64 * self.aligned_size) as u32;

        let bytes = bytemuck::bytes_of(value);
        self.data.extend_from_slice(bytes);

        let padding = self.aligned_size as usize - bytes.len();
        self.data.extend(std::iter::repeat_n(0u8, padding));

        self.count += 1;
        offset
    }

    /// Flushes accumulated entries to the GPU in a single `write_buffer`.
    ///
    /// Returns true if the buffer was reallocated to grow, in which case any
    /// bind group referencing it must be recreated.
    pub fn flush(&mut self) -> bool {
        if self.data.is_empty() {
            return false;
        }

        let required_size = self.data.len() as u64;

        let reallocated = if required_size > self.capacity {
            self.grow(required_size);
            true
        } else {
            false
        };

        let ctxt = Context::get();
        ctxt.write_buffer(&self.buffer, 0, &self.data);

        reallocated
    }

    fn grow(&mut self, required_size: u64) {
        let ctxt = Context::get();

        let mut new_capacity = self.capacity;
        while new_capacity < required_size {
            new_capacity *= 2;
        }

        self.buffer = ctxt.create_buffer_simple(
            Some("occluder_instance_uniforms"),
            new_capacity,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        self.capacity = new_capacity;
    }

    /// Returns a reference to the underlying GPU buffer.
    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_uniforms_layout_matches_shader() {
        // One mat4x4<f32>, 64 bytes, no padding.
        assert_eq!(mem::size_of::<InstanceUniforms>(), 64);
        assert_eq!(mem::offset_of!(InstanceUniforms, model), 0);
    }
}
