//! Color type and the constants used by the effect defaults.
//!
//! Components are f32 in [0.0, 1.0], linear RGB. The sun color and the sky
//! background are plain [`Color`] values; no color management is performed
//! beyond the optional color-temperature correction in [`crate::light`].

pub use rgb::Rgba;

/// The color type used throughout sunshafts. RGBA with f32 components in [0.0, 1.0].
pub type Color = Rgba<f32>;

/// Black (0, 0, 0). The occluder override color.
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// White (255, 255, 255).
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// A plain daytime sky color, usable as the occluder pass sky background.
pub const SKY: Color = Color::new(0.53, 0.81, 0.92, 1.0);

/// Warm sunlight, approximating an unfiltered late-afternoon sun.
pub const SUNLIGHT: Color = Color::new(1.0, 0.956, 0.839, 1.0);
