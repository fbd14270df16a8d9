/*!
# sunshafts

Volumetric light scattering ("god rays") render passes for wgpu.

The crate implements a single screen-space effect as a plug-in render pass:
scene geometry is rasterized into a downsampled occluder mask, then the mask
is blitted onto the camera color target through a radial blur centered on the
projected sun position. Everything the effect needs from the host renderer
(the camera, the primary directional light, the visible opaque geometry and
the shading stages) is injected through small traits, so the per-frame math
stays testable without a live engine.

A frame looks like this:

```no_run
use sunshafts::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

# fn frame(camera: &PerspectiveCamera, lighting: &SceneLights, visible: &VisibleSet,
#          camera_color_view: &wgpu::TextureView, width: u32, height: u32) {
let registry = Rc::new(RefCell::new(ShaderRegistry::new()));
let settings = ScatteringSettings::default().with_intensity(0.8);

let mut schedule = PassSchedule::new();
schedule.add_pass(Box::new(VolumetricLightScatteringPass::new(settings, registry)));

// Once per camera per frame, after the scene color is complete:
schedule.run_frame(camera, lighting, visible, camera_color_view, SKY, width, height);
# }
```

The pass degrades silently: no enabled directional light, or a missing
shading stage, means no commands are recorded for that frame.
*/
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]

pub use glamx;

pub mod camera;
pub mod color;
pub mod context;
pub mod light;
pub mod pipeline;
pub mod resource;
pub mod scattering;
pub mod scene;

pub mod prelude {
    pub use crate::camera::*;
    pub use crate::color::{Color, BLACK, SKY, WHITE};
    pub use crate::context::*;
    pub use crate::light::*;
    pub use crate::pipeline::*;
    pub use crate::resource::*;
    pub use crate::scattering::*;
    pub use crate::scene::*;
    pub use glamx::{Mat4, Pose3, Quat, Vec2, Vec3};
}
