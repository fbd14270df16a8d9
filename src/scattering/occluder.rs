//! The occluder mask stage.
//!
//! Rasterizes the visible opaque instances through the unlit occluder
//! override into the downsampled mask target. The pass first "draws" the sky
//! by clearing the target to the frame's sky color; the override stage then
//! stamps solid silhouettes on top. Draw order is irrelevant: the stage is
//! unlit, the target is private, and there is no depth attachment.

use crate::color::Color;
use crate::context::Context;
use crate::resource::{InstanceBuffer, InstanceUniforms, RenderTarget, ShaderStage};
use crate::scattering::frame::CameraFrame;
use crate::scene::VisibleSet;
use bytemuck::{Pod, Zeroable};

/// Frame-level uniforms for the occluder stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct OccluderFrameUniforms {
    proj_view: [[f32; 4]; 4],
}

/// Records the occluder mask rasterization.
pub struct OccluderStage {
    pipeline: wgpu::RenderPipeline,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    instance_bind_group_layout: wgpu::BindGroupLayout,
    instance_bind_group: wgpu::BindGroup,
    instances: InstanceBuffer,
}

impl OccluderStage {
    /// Builds the occluder pipeline from the resolved shading stage.
    pub fn new(stage: &ShaderStage) -> OccluderStage {
        let ctxt = Context::get();

        let frame_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("occluder_frame_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let instance_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("occluder_instance_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<InstanceUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("occluder_pipeline_layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &instance_bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffer_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        };

        let pipeline = ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("occluder_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: stage.module(),
                entry_point: Some("vs_main"),
                buffers: &[vertex_buffer_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: stage.module(),
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctxt.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let frame_uniform_buffer = ctxt.create_buffer_simple(
            Some("occluder_frame_uniforms"),
            std::mem::size_of::<OccluderFrameUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("occluder_frame_bind_group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let instances = InstanceBuffer::new();
        let instance_bind_group =
            Self::create_instance_bind_group(&instance_bind_group_layout, &instances);

        OccluderStage {
            pipeline,
            frame_uniform_buffer,
            frame_bind_group,
            instance_bind_group_layout,
            instance_bind_group,
            instances,
        }
    }

    fn create_instance_bind_group(
        layout: &wgpu::BindGroupLayout,
        instances: &InstanceBuffer,
    ) -> wgpu::BindGroup {
        let ctxt = Context::get();
        ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("occluder_instance_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: instances.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<InstanceUniforms>() as u64),
                }),
            }],
        })
    }

    /// Records the occluder mask pass into the frame encoder.
    ///
    /// The target is fully cleared to the sky color before the silhouettes
    /// are drawn, so a skipped previous frame can never leak stale content.
    pub fn record(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget,
        sky_color: Color,
        camera: &CameraFrame,
        visible: &VisibleSet,
    ) {
        let ctxt = Context::get();
        let color_view = match target.color_view() {
            Some(view) => view,
            None => return,
        };

        let frame_uniforms = OccluderFrameUniforms {
            proj_view: camera.proj_view.to_cols_array_2d(),
        };
        ctxt.write_buffer(
            &self.frame_uniform_buffer,
            0,
            bytemuck::bytes_of(&frame_uniforms),
        );

        self.instances.clear();
        let offsets: Vec<u32> = visible
            .iter()
            .map(|instance| {
                self.instances.push(&InstanceUniforms {
                    model: instance.model_matrix().to_cols_array_2d(),
                })
            })
            .collect();
        if self.instances.flush() {
            self.instance_bind_group =
                Self::create_instance_bind_group(&self.instance_bind_group_layout, &self.instances);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("occluder_mask_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: sky_color.r as f64,
                        g: sky_color.g as f64,
                        b: sky_color.b as f64,
                        a: sky_color.a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if visible.is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (instance, offset) in visible.iter().zip(offsets) {
            render_pass.set_bind_group(1, &self.instance_bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, instance.mesh.vertex_buffer().slice(..));
            render_pass.set_index_buffer(
                instance.mesh.index_buffer().slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(0..instance.mesh.num_indices(), 0, 0..1);
        }
    }
}
