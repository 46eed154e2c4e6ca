use serde::{Deserialize, Serialize};

use crate::consts::{HUE_COLD_LIMIT, MAX_INTENSITY};

use super::CalibrationScale;

/// Pixel-to-temperature conversion applied by the palette pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelModel {
    /// Gray level scales linearly from `min` (0) to `max` (255).
    LinearIntensity,
    /// Hue of a rainbow palette read as temperature (red hot, blue cold).
    HueInversion,
}

impl std::fmt::Display for PixelModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinearIntensity => write!(f, "Linear Intensity"),
            Self::HueInversion => write!(f, "Hue Inversion"),
        }
    }
}

/// `min + (intensity / 255) * (max - min)`.
pub fn intensity_to_temp(intensity: u8, scale: &CalibrationScale) -> f64 {
    scale.min_temp() + (intensity as f64 / MAX_INTENSITY) * scale.span()
}

/// Invert a rainbow-palette hue (half-degree scale, [0, 180)) to temperature.
///
/// Hue is clipped to [0, 120] first so violet tones read as the coldest blue.
/// Hue 0 (red) gives `max`, hue 120 (blue) gives `min`, linearly in between.
///
/// This is a heuristic: real palettes are not linear in hue, JPEG compression
/// shifts hues, and the scale endpoints are whatever the camera app rendered.
/// Expect it to be less accurate than a radiometric reading.
pub fn hue_to_temp(hue: f32, scale: &CalibrationScale) -> f64 {
    let hue = (hue as f64).clamp(0.0, HUE_COLD_LIMIT);
    let factor = (HUE_COLD_LIMIT - hue) / HUE_COLD_LIMIT;
    scale.min_temp() + factor * scale.span()
}
