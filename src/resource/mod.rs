//! GPU resource managers

pub use crate::resource::instance_buffer::{InstanceBuffer, InstanceUniforms};
pub use crate::resource::render_target::{FramebufferManager, OffscreenBuffers, RenderTarget};
pub use crate::resource::shader_registry::{
    ShaderRegistry, ShaderStage, OCCLUDER_STAGE, RADIAL_BLUR_STAGE,
};

mod instance_buffer;
mod render_target;
mod shader_registry;
