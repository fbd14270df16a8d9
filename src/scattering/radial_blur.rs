//! The radial blur composite stage.
//!
//! Blits the occluder mask onto the camera color target through the radial
//! blur shading stage. The blur parameters are written into the stage's
//! uniform buffer once per frame (this stage is the [`ParamSink`] the planner
//! pushes into); the blit blends additively so the shafts brighten the
//! already-rendered scene.

use crate::context::Context;
use crate::resource::{RenderTarget, ShaderStage};
use crate::scattering::frame::{BlurParams, ParamSink};
use bytemuck::{Pod, Zeroable};

/// Vertex data for the full-screen quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 2],
}

/// Uniforms for the radial blur stage, mirroring the WGSL layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct RadialBlurUniforms {
    center: [f32; 2],
    blur_width: f32,
    intensity: f32,
    color: [f32; 4],
    noise_speed: [f32; 2],
    noise_scale: f32,
    noise_strength: f32,
    num_samples: u32,
    time: f32,
    _padding: [f32; 2],
}

impl From<&BlurParams> for RadialBlurUniforms {
    fn from(params: &BlurParams) -> Self {
        RadialBlurUniforms {
            center: [params.center.x, params.center.y],
            blur_width: params.blur_width,
            intensity: params.intensity,
            color: [
                params.color.r,
                params.color.g,
                params.color.b,
                params.color.a,
            ],
            noise_speed: [params.noise_speed.x, params.noise_speed.y],
            noise_scale: params.noise_scale,
            noise_strength: params.noise_strength,
            num_samples: params.num_samples,
            time: params.time,
            _padding: [0.0; 2],
        }
    }
}

/// Records the radial blur blit.
pub struct RadialBlurStage {
    pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
}

impl RadialBlurStage {
    /// Builds the radial blur pipeline from the resolved shading stage.
    pub fn new(stage: &ShaderStage) -> RadialBlurStage {
        let ctxt = Context::get();

        let texture_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("radial_blur_texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let uniform_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("radial_blur_uniform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("radial_blur_pipeline_layout"),
            bind_group_layouts: &[&texture_bind_group_layout, &uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffer_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        };

        let pipeline = ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("radial_blur_pipeline"),
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
                    // Shafts add light on top of the rendered scene.
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::Zero,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
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

        let vertices = [
            QuadVertex {
                position: [-1.0, -1.0],
            },
            QuadVertex {
                position: [1.0, -1.0],
            },
            QuadVertex {
                position: [-1.0, 1.0],
            },
            QuadVertex {
                position: [1.0, 1.0],
            },
        ];

        let vertex_buffer = ctxt.create_buffer_init(
            Some("radial_blur_vertex_buffer"),
            bytemuck::cast_slice(&vertices),
            wgpu::BufferUsages::VERTEX,
        );

        let uniform_buffer = ctxt.create_buffer_simple(
            Some("radial_blur_uniform_buffer"),
            std::mem::size_of::<RadialBlurUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let uniform_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("radial_blur_uniform_bind_group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        RadialBlurStage {
            pipeline,
            texture_bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
        }
    }

    /// Records the composite blit into the frame encoder.
    ///
    /// Samples the occluder mask and blends the blurred shafts onto
    /// `output_view`. The camera color is loaded, not cleared: this stage
    /// only adds on top of the scene.
    pub fn record(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        source: &RenderTarget,
        output_view: &wgpu::TextureView,
    ) {
        let ctxt = Context::get();

        let (color_view, sampler) = match source {
            RenderTarget::Offscreen(o) => (&o.color_view, &o.sampler),
            RenderTarget::Screen => return,
        };

        // The mask is recreated on resize, so the bind group is per-frame.
        let texture_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("radial_blur_texture_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("radial_blur_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: output_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &texture_bind_group, &[]);
            render_pass.set_bind_group(1, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..4, 0..1);
        }
    }
}

impl ParamSink for RadialBlurStage {
    fn push(&mut self, params: &BlurParams) {
        let ctxt = Context::get();
        let uniforms = RadialBlurUniforms::from(params);
        ctxt.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_layout_matches_shader() {
        use std::mem;
        // Four 16-byte rows, std140-compatible.
        assert_eq!(mem::size_of::<RadialBlurUniforms>(), 64);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, center), 0);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, blur_width), 8);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, intensity), 12);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, color), 16);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, noise_speed), 32);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, noise_scale), 40);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, noise_strength), 44);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, num_samples), 48);
        assert_eq!(mem::offset_of!(RadialBlurUniforms, time), 52);
    }
}
