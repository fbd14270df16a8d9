//! Host-editable configuration for the scattering effect.

use glamx::Vec2;

/// Configuration of the volumetric light scattering effect.
///
/// Fields are read once per frame; edits between frames take effect on the
/// next frame. Out-of-range values are snapped by [`clamped`](Self::clamped)
/// before use, so a host wiring these to UI sliders never has to validate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScatteringSettings {
    /// Downsample factor for the occluder mask target, in [0.1, 1.0].
    pub resolution_scale: f32,
    /// Overall effect strength, in [0.0, 1.0].
    pub intensity: f32,
    /// Length of the blur rays, as a fraction of the distance to the blur
    /// center, in [0.0, 1.0].
    pub blur_width: f32,
    /// How quickly the effect fades as the camera turns away from the sun,
    /// in [0.0, 0.5]. Smaller values fade faster.
    pub fade_range: f32,
    /// Number of samples along each blur ray, in [50, 200].
    pub num_samples: u32,
    /// Scroll speed of the animated noise, per axis.
    pub noise_speed: Vec2,
    /// Spatial frequency of the animated noise.
    pub noise_scale: f32,
    /// How strongly the noise modulates the shafts, in [0.0, 1.0].
    pub noise_strength: f32,
}

impl Default for ScatteringSettings {
    fn default() -> Self {
        Self {
            resolution_scale: 0.5,
            intensity: 1.0,
            blur_width: 0.85,
            fade_range: 0.2,
            num_samples: 100,
            noise_speed: Vec2::splat(0.5),
            noise_scale: 1.0,
            noise_strength: 0.6,
        }
    }
}

impl ScatteringSettings {
    /// Sets the occluder target downsample factor.
    pub fn with_resolution_scale(mut self, resolution_scale: f32) -> Self {
        self.resolution_scale = resolution_scale;
        self
    }

    /// Sets the overall effect strength.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets the blur ray length.
    pub fn with_blur_width(mut self, blur_width: f32) -> Self {
        self.blur_width = blur_width;
        self
    }

    /// Sets the fade range.
    pub fn with_fade_range(mut self, fade_range: f32) -> Self {
        self.fade_range = fade_range;
        self
    }

    /// Sets the number of samples per blur ray.
    pub fn with_num_samples(mut self, num_samples: u32) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Sets the noise scroll speed.
    pub fn with_noise_speed(mut self, noise_speed: Vec2) -> Self {
        self.noise_speed = noise_speed;
        self
    }

    /// Sets the noise spatial frequency.
    pub fn with_noise_scale(mut self, noise_scale: f32) -> Self {
        self.noise_scale = noise_scale;
        self
    }

    /// Sets the noise modulation strength.
    pub fn with_noise_strength(mut self, noise_strength: f32) -> Self {
        self.noise_strength = noise_strength;
        self
    }

    /// Returns a copy with every field snapped into its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            resolution_scale: self.resolution_scale.clamp(0.1, 1.0),
            intensity: self.intensity.clamp(0.0, 1.0),
            blur_width: self.blur_width.clamp(0.0, 1.0),
            fade_range: self.fade_range.clamp(0.0, 0.5),
            num_samples: self.num_samples.clamp(50, 200),
            noise_speed: self.noise_speed,
            noise_scale: self.noise_scale,
            noise_strength: self.noise_strength.clamp(0.0, 1.0),
        }
    }

    /// The occluder target dimensions for a camera target of the given size.
    ///
    /// Each axis is the camera dimension times the resolution scale, rounded,
    /// and never below one pixel.
    pub fn occluder_extent(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = self.resolution_scale.clamp(0.1, 1.0);
        let w = ((width as f32 * scale).round() as u32).max(1);
        let h = ((height as f32 * scale).round() as u32).max(1);
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_documented_ranges() {
        let settings = ScatteringSettings::default();
        assert_eq!(settings, settings.clamped());
    }

    #[test]
    fn occluder_extent_rounds_scaled_camera_size() {
        let cases = [
            (1920u32, 1080u32, 0.5f32, 960u32, 540u32),
            (1920, 1080, 1.0, 1920, 1080),
            (1280, 720, 0.1, 128, 72),
            (1919, 1079, 0.5, 960, 540), // 959.5 and 539.5 round up
            (800, 600, 0.25, 200, 150),
        ];
        for (w, h, scale, ew, eh) in cases {
            let settings = ScatteringSettings::default().with_resolution_scale(scale);
            assert_eq!(settings.occluder_extent(w, h), (ew, eh), "{}x{} @ {}", w, h, scale);
        }
    }

    #[test]
    fn occluder_extent_never_collapses_to_zero() {
        let settings = ScatteringSettings::default().with_resolution_scale(0.1);
        assert_eq!(settings.occluder_extent(1, 1), (1, 1));
        assert_eq!(settings.occluder_extent(0, 0), (1, 1));
        assert_eq!(settings.occluder_extent(3, 9), (1, 1));
    }

    #[test]
    fn occluder_extent_clamps_out_of_range_scale() {
        let tiny = ScatteringSettings::default().with_resolution_scale(0.0);
        assert_eq!(tiny.occluder_extent(1000, 500), (100, 50));

        let huge = ScatteringSettings::default().with_resolution_scale(4.0);
        assert_eq!(huge.occluder_extent(1000, 500), (1000, 500));
    }

    #[test]
    fn clamped_snaps_out_of_range_fields() {
        let settings = ScatteringSettings::default()
            .with_resolution_scale(2.0)
            .with_intensity(-1.0)
            .with_blur_width(7.5)
            .with_fade_range(0.9)
            .with_num_samples(1000)
            .with_noise_strength(1.5)
            .clamped();

        assert_eq!(settings.resolution_scale, 1.0);
        assert_eq!(settings.intensity, 0.0);
        assert_eq!(settings.blur_width, 1.0);
        assert_eq!(settings.fade_range, 0.5);
        assert_eq!(settings.num_samples, 200);
        assert_eq!(settings.noise_strength, 1.0);
    }
}
