//! Pure per-frame math: sun projection, intensity fade, blur parameters.
//!
//! Everything here is a function of values captured at the start of the
//! frame; nothing touches the GPU. The pass snapshots the camera into a
//! [`CameraFrame`], plans the frame, and only records commands when planning
//! yields parameters.

use crate::camera::{project_viewport, RenderCamera};
use crate::color::Color;
use crate::light::DirectionalLight;
use crate::scattering::ScatteringSettings;
use glamx::{Mat4, Vec2, Vec3};

/// The camera state the effect reads, captured once per frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraFrame {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Normalized world-space view direction.
    pub forward: Vec3,
    /// View-projection matrix.
    pub proj_view: Mat4,
}

impl CameraFrame {
    /// Captures the relevant camera state for this frame.
    pub fn capture(camera: &dyn RenderCamera) -> CameraFrame {
        CameraFrame {
            eye: camera.eye(),
            forward: camera.forward(),
            proj_view: camera.transformation(),
        }
    }

    /// Projects a world-space point into viewport coordinates.
    pub fn project_viewport(&self, world_coord: Vec3) -> Vec2 {
        project_viewport(&self.proj_view, world_coord)
    }
}

/// The parameter set pushed into the radial blur stage, recomputed from
/// scratch every frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlurParams {
    /// Viewport-space position of the sun, the center of the blur.
    pub center: Vec2,
    /// The sun color, color-temperature corrected when configured.
    pub color: Color,
    /// Length of the blur rays.
    pub blur_width: f32,
    /// Number of samples along each blur ray.
    pub num_samples: u32,
    /// Final shaft intensity: configured intensity times the view fade.
    pub intensity: f32,
    /// Scroll speed of the animated noise.
    pub noise_speed: Vec2,
    /// Spatial frequency of the animated noise.
    pub noise_scale: f32,
    /// Noise modulation strength.
    pub noise_strength: f32,
    /// Seconds since the pass was created, driving the noise animation.
    pub time: f32,
}

/// How strongly the effect shows for a given view/sun geometry, in [0, 1].
///
/// The fade combines "is the camera looking roughly toward the sun" with a
/// penalty for looking downward (shafts read poorly against the ground):
/// `(dot(-forward, sun_dir) - dot(forward, down)) / fade_range`, saturated.
/// With this sign convention the effect is strongest when the camera faces
/// *against* the light's travel direction, i.e. into the sun.
pub fn intensity_fade(forward: Vec3, sun_direction: Vec3, fade_range: f32) -> f32 {
    let down = -Vec3::Y;
    let mut dot_prod = (-forward).dot(sun_direction);
    dot_prod -= forward.dot(down);
    (dot_prod / fade_range.max(f32::EPSILON)).clamp(0.0, 1.0)
}

/// Plans one frame of the effect.
///
/// Returns `None` when the frame must be skipped: no directional light, or
/// the light disabled. Otherwise returns the full parameter set for the
/// radial blur stage. Deterministic: identical inputs yield identical
/// parameters.
pub fn plan(
    camera: &CameraFrame,
    light: Option<&DirectionalLight>,
    settings: &ScatteringSettings,
    time: f32,
) -> Option<BlurParams> {
    let light = light?;
    if !light.enabled {
        return None;
    }

    let settings = settings.clamped();
    let sun_direction = light.direction.normalize();

    // Only the direction matters for a directional light, so any point along
    // it works as a stand-in sun position; one unit from the eye keeps the
    // projection well-conditioned.
    let sun_world = camera.eye + sun_direction;
    let center = camera.project_viewport(sun_world);

    let fade = intensity_fade(camera.forward, sun_direction, settings.fade_range);

    Some(BlurParams {
        center,
        color: light.effective_color(),
        blur_width: settings.blur_width,
        num_samples: settings.num_samples,
        intensity: settings.intensity * fade,
        noise_speed: settings.noise_speed,
        noise_scale: settings.noise_scale,
        noise_strength: settings.noise_strength,
        time,
    })
}

/// Sink receiving the blur parameter set.
///
/// The GPU-side implementation writes the stage's uniform buffer; tests
/// substitute a recorder. Pushed at most once per frame.
pub trait ParamSink {
    /// Receives this frame's parameter set.
    fn push(&mut self, params: &BlurParams);
}

/// Plans one frame and pushes the parameters into `sink` when the effect is
/// visible. Returns the pushed parameters, or `None` when the frame was
/// skipped and nothing was pushed.
pub fn plan_into(
    sink: &mut dyn ParamSink,
    camera: &CameraFrame,
    light: Option<&DirectionalLight>,
    settings: &ScatteringSettings,
    time: f32,
) -> Option<BlurParams> {
    let params = plan(camera, light, settings, time)?;
    sink.push(&params);
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_facing(forward: Vec3) -> CameraFrame {
        CameraFrame {
            eye: Vec3::ZERO,
            forward: forward.normalize(),
            proj_view: Mat4::IDENTITY,
        }
    }

    struct CountingSink(usize);

    impl ParamSink for CountingSink {
        fn push(&mut self, _: &BlurParams) {
            self.0 += 1;
        }
    }

    #[test]
    fn sun_along_forward_axis_fades_to_zero() {
        // Camera at the origin facing +Z, sun travelling +Z: the camera looks
        // *away* from the sun under this sign convention.
        let camera = frame_facing(Vec3::Z);
        let sun = DirectionalLight::new(Vec3::Z);
        let settings = ScatteringSettings::default()
            .with_fade_range(0.2)
            .with_intensity(1.0);

        let params = plan(&camera, Some(&sun), &settings, 0.0).unwrap();
        assert_eq!(params.intensity, 0.0);
    }

    #[test]
    fn sun_opposite_forward_axis_reaches_full_intensity() {
        let camera = frame_facing(Vec3::Z);
        let sun = DirectionalLight::new(Vec3::NEG_Z);
        let settings = ScatteringSettings::default()
            .with_fade_range(0.2)
            .with_intensity(0.75);

        let params = plan(&camera, Some(&sun), &settings, 0.0).unwrap();
        assert!((params.intensity - 0.75).abs() < 1e-6);
    }

    #[test]
    fn fade_is_always_saturated() {
        use rand::Rng;
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let forward = Vec3::new(rng.random(), rng.random(), rng.random()).normalize();
            let sun = Vec3::new(rng.random(), rng.random(), rng.random()).normalize();
            let range = rng.random::<f32>() * 0.5;
            let fade = intensity_fade(forward, sun, range);
            assert!((0.0..=1.0).contains(&fade), "fade {} out of range", fade);
        }
    }

    #[test]
    fn fade_grows_as_camera_turns_toward_sun() {
        // Sweep the camera in the horizontal plane from facing away from the
        // sun to facing straight into it; the fade must never decrease.
        let sun = Vec3::NEG_Z;
        let mut last = -1.0f32;
        for step in 0..=64 {
            // Angle between the camera forward and the into-sun direction
            // (+Z), shrinking from 180° to 0° over the sweep.
            let angle = std::f32::consts::PI * (1.0 - step as f32 / 64.0);
            let forward = Vec3::new(angle.sin(), 0.0, angle.cos());
            let fade = intensity_fade(forward, sun, 0.3);
            assert!(fade >= last, "fade decreased while turning toward the sun");
            last = fade;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn no_light_records_nothing() {
        let camera = frame_facing(Vec3::Z);
        let settings = ScatteringSettings::default();
        let mut sink = CountingSink(0);

        assert!(plan_into(&mut sink, &camera, None, &settings, 0.0).is_none());
        assert_eq!(sink.0, 0);
    }

    #[test]
    fn disabled_light_records_nothing() {
        let camera = frame_facing(Vec3::Z);
        let sun = DirectionalLight::new(Vec3::NEG_Z).with_enabled(false);
        let settings = ScatteringSettings::default();
        let mut sink = CountingSink(0);

        assert!(plan_into(&mut sink, &camera, Some(&sun), &settings, 0.0).is_none());
        assert_eq!(sink.0, 0);
    }

    #[test]
    fn enabled_light_records_exactly_once() {
        let camera = frame_facing(Vec3::Z);
        let sun = DirectionalLight::new(Vec3::NEG_Z);
        let settings = ScatteringSettings::default();
        let mut sink = CountingSink(0);

        assert!(plan_into(&mut sink, &camera, Some(&sun), &settings, 0.0).is_some());
        assert_eq!(sink.0, 1);
    }

    #[test]
    fn planning_is_deterministic() {
        let camera = CameraFrame {
            eye: Vec3::new(3.0, 1.5, -2.0),
            forward: Vec3::new(0.3, -0.1, -0.9).normalize(),
            proj_view: Mat4::perspective_rh_gl(1.0, 16.0 / 9.0, 0.1, 1000.0),
        };
        let sun = DirectionalLight::new(Vec3::new(-0.4, -0.8, 0.2))
            .with_color(Color::new(1.0, 0.9, 0.7, 1.0))
            .with_color_temperature(5200.0);
        let settings = ScatteringSettings::default().with_intensity(0.8);

        let a = plan(&camera, Some(&sun), &settings, 1.25).unwrap();
        let b = plan(&camera, Some(&sun), &settings, 1.25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn params_use_color_temperature_corrected_color() {
        let camera = frame_facing(Vec3::Z);
        let sun = DirectionalLight::new(Vec3::NEG_Z)
            .with_color(Color::new(1.0, 1.0, 1.0, 1.0))
            .with_color_temperature(2500.0);
        let settings = ScatteringSettings::default();

        let params = plan(&camera, Some(&sun), &settings, 0.0).unwrap();
        assert_eq!(params.color, sun.effective_color());
        assert!(params.color.b < 0.5, "a 2500K sun should be warm");
    }

    #[test]
    fn center_is_sun_position_projected_to_viewport() {
        // A real perspective camera at the origin looking down -Z with the
        // sun travelling +Z: the synthetic sun position is straight ahead, so
        // the blur centers on the middle of the screen.
        use crate::camera::PerspectiveCamera;
        let camera = PerspectiveCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let frame = CameraFrame::capture(&camera);
        let sun = DirectionalLight::new(Vec3::NEG_Z);
        let settings = ScatteringSettings::default();

        let params = plan(&frame, Some(&sun), &settings, 0.0).unwrap();
        assert!((params.center - Vec2::new(0.5, 0.5)).length() < 1e-4);
    }
}
