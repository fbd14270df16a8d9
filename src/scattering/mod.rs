//! The volumetric light scattering effect.
//!
//! Split the way the frame works: [`settings`] is the host-editable
//! configuration, [`frame`] is the pure per-frame math (sun projection,
//! intensity fade, blur parameters), [`occluder`] and [`radial_blur`] record
//! the two GPU stages, and [`pass`] ties them into the render pass lifecycle.

pub use self::frame::{plan, plan_into, BlurParams, CameraFrame, ParamSink};
pub use self::occluder::OccluderStage;
pub use self::pass::VolumetricLightScatteringPass;
pub use self::radial_blur::RadialBlurStage;
pub use self::settings::ScatteringSettings;

pub mod frame;
mod occluder;
mod pass;
mod radial_blur;
pub mod settings;
