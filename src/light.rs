//! The directional "sun" light and the scene lighting query.
//!
//! The effect only ever asks the scene one question: what is the primary
//! directional light right now? Hosts answer through [`SceneLighting`];
//! [`SceneLights`] is a ready-made answer for hosts without their own
//! lighting system.

use crate::color::{Color, WHITE};
use glamx::Vec3;

/// A directional light with parallel rays (the sun).
///
/// The light has no position, only a direction. Its color is optionally
/// derived from a correlated color temperature in Kelvin, matching how
/// photographic light rigs are usually described.
///
/// # Examples
/// ```
/// # use sunshafts::prelude::*;
/// // A warm evening sun, low over the horizon.
/// let sun = DirectionalLight::new(Vec3::new(-1.0, -0.2, 0.0))
///     .with_color(Color::new(1.0, 0.9, 0.8, 1.0))
///     .with_color_temperature(3500.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionalLight {
    /// Normalized world-space direction the light travels (from the sun,
    /// toward the scene).
    pub direction: Vec3,
    /// The color of the light (RGBA, each component 0.0-1.0).
    pub color: Color,
    /// Correlated color temperature in Kelvin. When set, the light color is
    /// tinted by the matching blackbody color before use.
    pub color_temperature: Option<f32>,
    /// Whether the light is enabled.
    pub enabled: bool,
}

impl DirectionalLight {
    /// Creates an enabled white directional light.
    ///
    /// The direction is normalized; it must not be the zero vector.
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction: direction.normalize(),
            color: WHITE,
            color_temperature: None,
            enabled: true,
        }
    }

    /// Sets the light color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the correlated color temperature in Kelvin.
    pub fn with_color_temperature(mut self, kelvin: f32) -> Self {
        self.color_temperature = Some(kelvin);
        self
    }

    /// Sets whether the light is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The light color as sent to the shading stages.
    ///
    /// When a color temperature is configured, the base color is multiplied
    /// component-wise by the blackbody color for that temperature; otherwise
    /// the base color is returned unmodified.
    pub fn effective_color(&self) -> Color {
        match self.color_temperature {
            Some(kelvin) => {
                let tint = correlated_color_temperature_to_rgb(kelvin);
                Color::new(
                    self.color.r * tint.r,
                    self.color.g * tint.g,
                    self.color.b * tint.b,
                    self.color.a,
                )
            }
            None => self.color,
        }
    }
}

/// The scene lighting query the effect depends on.
///
/// Implemented by the host's lighting system. Returning `None` (no primary
/// directional light, or the light disabled upstream) skips the effect for
/// the frame.
pub trait SceneLighting {
    /// The primary directional light of the scene, if any.
    fn primary_directional_light(&self) -> Option<&DirectionalLight>;
}

/// Minimal [`SceneLighting`] implementation: a single optional sun.
#[derive(Clone, Debug, Default)]
pub struct SceneLights {
    sun: Option<DirectionalLight>,
}

impl SceneLights {
    /// Creates a lighting state with no sun.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sun light.
    pub fn set_sun(&mut self, sun: DirectionalLight) {
        self.sun = Some(sun);
    }

    /// Removes the sun light.
    pub fn clear_sun(&mut self) {
        self.sun = None;
    }

    /// Mutable access to the sun light, if any.
    pub fn sun_mut(&mut self) -> Option<&mut DirectionalLight> {
        self.sun.as_mut()
    }
}

impl SceneLighting for SceneLights {
    fn primary_directional_light(&self) -> Option<&DirectionalLight> {
        self.sun.as_ref()
    }
}

/// Converts a correlated color temperature in Kelvin to a linear RGB tint.
///
/// Standard blackbody approximation (rational/log fit on the Planckian
/// locus), valid for 1000 K - 40000 K; inputs outside that range are
/// clamped. Neutral around 6600 K, warm below, cool above.
pub fn correlated_color_temperature_to_rgb(kelvin: f32) -> Color {
    let t = kelvin.clamp(1000.0, 40000.0) / 100.0;

    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_727_446 * (t - 60.0).powf(-0.133_204_759_2)
    };

    let g = if t <= 66.0 {
        99.470_802_586_1 * t.ln() - 161.119_568_166_1
    } else {
        288.122_169_528_3 * (t - 60.0).powf(-0.075_514_849_2)
    };

    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (t - 10.0).ln() - 305.044_792_730_7
    };

    Color::new(
        (r / 255.0).clamp(0.0, 1.0),
        (g / 255.0).clamp(0.0, 1.0),
        (b / 255.0).clamp(0.0, 1.0),
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized() {
        let light = DirectionalLight::new(Vec3::new(3.0, -4.0, 0.0));
        assert!((light.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cct_is_neutral_near_6600k() {
        let c = correlated_color_temperature_to_rgb(6600.0);
        assert!(c.r > 0.99 && c.g > 0.99 && c.b > 0.99, "got {:?}", c);
    }

    #[test]
    fn cct_is_warm_at_low_temperature() {
        let c = correlated_color_temperature_to_rgb(2000.0);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!(c.b < 0.2, "candlelight should have little blue, got {}", c.b);
        assert!(c.g < c.r && c.g > c.b);
    }

    #[test]
    fn cct_is_cool_at_high_temperature() {
        let c = correlated_color_temperature_to_rgb(10000.0);
        assert!((c.b - 1.0).abs() < 1e-6);
        assert!(c.r < 0.9, "clear-sky blue should have reduced red, got {}", c.r);
    }

    #[test]
    fn cct_blue_grows_with_temperature() {
        let mut last = -1.0f32;
        for kelvin in [1500.0, 2500.0, 4000.0, 5500.0, 6600.0] {
            let b = correlated_color_temperature_to_rgb(kelvin).b;
            assert!(b >= last, "blue must not decrease toward 6600K");
            last = b;
        }
    }

    #[test]
    fn cct_clamps_out_of_range_input() {
        let lo = correlated_color_temperature_to_rgb(100.0);
        let lo_ref = correlated_color_temperature_to_rgb(1000.0);
        assert_eq!(lo, lo_ref);

        let hi = correlated_color_temperature_to_rgb(1.0e6);
        let hi_ref = correlated_color_temperature_to_rgb(40000.0);
        assert_eq!(hi, hi_ref);
    }

    #[test]
    fn effective_color_without_temperature_is_base_color() {
        let base = Color::new(0.9, 0.8, 0.7, 1.0);
        let light = DirectionalLight::new(Vec3::NEG_Y).with_color(base);
        assert_eq!(light.effective_color(), base);
    }

    #[test]
    fn effective_color_with_temperature_is_componentwise_product() {
        let base = Color::new(0.5, 1.0, 0.25, 1.0);
        let light = DirectionalLight::new(Vec3::NEG_Y)
            .with_color(base)
            .with_color_temperature(2800.0);

        let tint = correlated_color_temperature_to_rgb(2800.0);
        let out = light.effective_color();
        assert!((out.r - base.r * tint.r).abs() < 1e-6);
        assert!((out.g - base.g * tint.g).abs() < 1e-6);
        assert!((out.b - base.b * tint.b).abs() < 1e-6);
        assert!((out.a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn scene_lights_round_trip() {
        let mut lights = SceneLights::new();
        assert!(lights.primary_directional_light().is_none());

        lights.set_sun(DirectionalLight::new(Vec3::NEG_Y));
        assert!(lights.primary_directional_light().is_some());

        lights.sun_mut().unwrap().enabled = false;
        assert!(!lights.primary_directional_light().unwrap().enabled);

        lights.clear_sun();
        assert!(lights.primary_directional_light().is_none());
    }
}
