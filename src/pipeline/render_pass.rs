use crate::camera::RenderCamera;
use crate::color::Color;
use crate::context::Context;
use crate::light::SceneLighting;
use crate::scene::VisibleSet;

/// Per-camera frame information available during pass setup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    /// The camera color target width in pixels.
    pub width: u32,
    /// The camera color target height in pixels.
    pub height: u32,
}

/// Context passed to render passes during execution.
///
/// Owns nothing: the encoder and color view belong to the frame driver, the
/// camera/lighting/visible-set references belong to the host.
pub struct FrameContext<'a> {
    /// The command encoder for this frame.
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// The camera color target to composite onto.
    pub camera_color_view: &'a wgpu::TextureView,
    /// The camera this frame renders from.
    pub camera: &'a dyn RenderCamera,
    /// The scene lighting query.
    pub lighting: &'a dyn SceneLighting,
    /// The opaque instances visible to this camera.
    pub visible: &'a VisibleSet,
    /// The sky background color for this frame.
    pub sky_color: Color,
    /// The camera color target width in pixels.
    pub viewport_width: u32,
    /// The camera color target height in pixels.
    pub viewport_height: u32,
}

/// A plug-in render pass driven by the host pipeline.
///
/// The three methods are invoked strictly in order, once per camera per
/// frame: `setup` sizes per-camera resources, `execute` records GPU commands
/// into the frame encoder, `cleanup` releases what `setup` allocated. A pass
/// that has nothing to do for a frame simply records nothing in `execute`.
pub trait RenderPass {
    /// Allocates or resizes per-camera resources for this frame.
    fn setup(&mut self, frame: &FrameInfo);

    /// Records this pass's GPU work into the frame encoder.
    fn execute(&mut self, ctx: &mut FrameContext);

    /// Releases the resources allocated by `setup`.
    fn cleanup(&mut self);
}

/// A fixed-order pass driver.
///
/// Hosts with a real render graph schedule passes themselves and only need
/// the [`RenderPass`] trait; `PassSchedule` is the minimal stand-in driver
/// that runs each registered pass through its lifecycle, in registration
/// order, once per frame.
#[derive(Default)]
pub struct PassSchedule {
    passes: Vec<Box<dyn RenderPass>>,
}

impl PassSchedule {
    /// Creates an empty schedule.
    pub fn new() -> PassSchedule {
        PassSchedule::default()
    }

    /// Appends a pass. Passes execute in registration order.
    pub fn add_pass(&mut self, pass: Box<dyn RenderPass>) {
        self.passes.push(pass);
    }

    /// The number of registered passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Returns true if no passes are registered.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Records one camera's frame into a host-owned encoder.
    ///
    /// Runs `setup` for every pass, then `execute` for every pass, then
    /// `cleanup` for every pass. The host submits the encoder.
    pub fn record_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        camera: &dyn RenderCamera,
        lighting: &dyn SceneLighting,
        visible: &VisibleSet,
        camera_color_view: &wgpu::TextureView,
        sky_color: Color,
        width: u32,
        height: u32,
    ) {
        let frame = FrameInfo { width, height };
        for pass in &mut self.passes {
            pass.setup(&frame);
        }

        for pass in &mut self.passes {
            let mut ctx = FrameContext {
                encoder: &mut *encoder,
                camera_color_view,
                camera,
                lighting,
                visible,
                sky_color,
                viewport_width: width,
                viewport_height: height,
            };
            pass.execute(&mut ctx);
        }

        for pass in &mut self.passes {
            pass.cleanup();
        }
    }

    /// Records and submits one camera's frame with an internally-created
    /// encoder.
    pub fn run_frame(
        &mut self,
        camera: &dyn RenderCamera,
        lighting: &dyn SceneLighting,
        visible: &VisibleSet,
        camera_color_view: &wgpu::TextureView,
        sky_color: Color,
        width: u32,
        height: u32,
    ) {
        let ctxt = Context::get();
        let mut encoder = ctxt.create_command_encoder(Some("sunshafts_frame_encoder"));

        self.record_frame(
            &mut encoder,
            camera,
            lighting,
            visible,
            camera_color_view,
            sky_color,
            width,
            height,
        );

        ctxt.submit(std::iter::once(encoder.finish()));
    }
}
