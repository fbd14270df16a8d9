//! The volumetric light scattering render pass.

use crate::pipeline::{FrameContext, FrameInfo, RenderPass};
use crate::resource::{
    FramebufferManager, RenderTarget, ShaderRegistry, OCCLUDER_STAGE, RADIAL_BLUR_STAGE,
};
use crate::scattering::frame::{plan_into, CameraFrame};
use crate::scattering::occluder::OccluderStage;
use crate::scattering::radial_blur::RadialBlurStage;
use crate::scattering::ScatteringSettings;
use std::cell::RefCell;
use std::rc::Rc;
use web_time::Instant;

/// Lazily-resolved shading stages. A failed resolution is cached so a broken
/// registry costs one lookup and one warning, not one per frame.
enum StageCache {
    Unresolved,
    Missing,
    Ready {
        occluder: OccluderStage,
        radial_blur: RadialBlurStage,
    },
}

/// The volumetric light scattering ("god rays") render pass.
///
/// Driven by the host through the [`RenderPass`] lifecycle, once per camera
/// per frame. `setup` sizes the downsampled occluder target to the camera
/// resolution, `execute` records the occluder rasterization and the radial
/// blur composite, `cleanup` releases the target.
///
/// The pass holds no frame-to-frame state beyond its configuration, the
/// occluder target and the compiled stages; every blur parameter is
/// recomputed from the scene each frame.
pub struct VolumetricLightScatteringPass {
    settings: ScatteringSettings,
    registry: Rc<RefCell<ShaderRegistry>>,
    framebuffers: FramebufferManager,
    occluder_target: Option<RenderTarget>,
    stages: StageCache,
    epoch: Instant,
}

impl VolumetricLightScatteringPass {
    /// Creates the pass.
    ///
    /// The shading stages are resolved from `registry` lazily, on the first
    /// executed frame; if either stage is missing the pass stays a no-op.
    pub fn new(
        settings: ScatteringSettings,
        registry: Rc<RefCell<ShaderRegistry>>,
    ) -> VolumetricLightScatteringPass {
        VolumetricLightScatteringPass {
            settings,
            registry,
            framebuffers: FramebufferManager::new(),
            occluder_target: None,
            stages: StageCache::Unresolved,
            epoch: Instant::now(),
        }
    }

    /// The current effect configuration.
    pub fn settings(&self) -> &ScatteringSettings {
        &self.settings
    }

    /// Replaces the effect configuration; takes effect next frame.
    pub fn set_settings(&mut self, settings: ScatteringSettings) {
        self.settings = settings;
    }

    /// Resolves and caches the shading stages; returns whether both exist.
    fn resolve_stages(&mut self) -> bool {
        match self.stages {
            StageCache::Ready { .. } => true,
            StageCache::Missing => false,
            StageCache::Unresolved => {
                let registry = self.registry.borrow();
                let occluder = registry.find(OCCLUDER_STAGE);
                let radial_blur = registry.find(RADIAL_BLUR_STAGE);
                drop(registry);

                match (occluder, radial_blur) {
                    (Some(occluder), Some(radial_blur)) => {
                        self.stages = StageCache::Ready {
                            occluder: OccluderStage::new(&occluder),
                            radial_blur: RadialBlurStage::new(&radial_blur),
                        };
                        true
                    }
                    (occluder, radial_blur) => {
                        if occluder.is_none() {
                            log::warn!(
                                "volumetric light scattering disabled: shading stage {:?} not found",
                                OCCLUDER_STAGE
                            );
                        }
                        if radial_blur.is_none() {
                            log::warn!(
                                "volumetric light scattering disabled: shading stage {:?} not found",
                                RADIAL_BLUR_STAGE
                            );
                        }
                        self.stages = StageCache::Missing;
                        false
                    }
                }
            }
        }
    }
}

impl RenderPass for VolumetricLightScatteringPass {
    fn setup(&mut self, frame: &FrameInfo) {
        let (width, height) = self.settings.occluder_extent(frame.width, frame.height);

        if let Some(target) = &mut self.occluder_target {
            target.resize(width, height, self.framebuffers.surface_format());
        } else {
            // Color only: the override stage is unlit and the target is
            // private, so a depth attachment buys nothing.
            self.occluder_target =
                Some(self.framebuffers.new_render_target(width, height, false));
        }
    }

    fn execute(&mut self, ctx: &mut FrameContext) {
        if !self.resolve_stages() {
            return;
        }

        let target = match self.occluder_target.as_ref() {
            Some(target) => target,
            None => return,
        };

        // The target must match the camera this frame; anything else means
        // setup/cleanup were invoked out of order.
        debug_assert_eq!(
            target.size(),
            Some(
                self.settings
                    .occluder_extent(ctx.viewport_width, ctx.viewport_height)
            ),
            "occluder target is stale; setup() did not run for this camera"
        );

        let camera = CameraFrame::capture(ctx.camera);
        let time = self.epoch.elapsed().as_secs_f32();
        let light = ctx.lighting.primary_directional_light();

        let (occluder, radial_blur) = match &mut self.stages {
            StageCache::Ready {
                occluder,
                radial_blur,
            } => (occluder, radial_blur),
            _ => return,
        };

        // No enabled sun: nothing is recorded this frame.
        if plan_into(&mut *radial_blur, &camera, light, &self.settings, time).is_none() {
            return;
        }

        occluder.record(ctx.encoder, target, ctx.sky_color, &camera, ctx.visible);
        radial_blur.record(ctx.encoder, target, ctx.camera_color_view);
    }

    fn cleanup(&mut self) {
        self.occluder_target = None;
    }
}
