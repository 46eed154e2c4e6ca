//! Registration of a low-resolution radiometric matrix onto a cropped
//! visual image.
//!
//! The sensor matrix is upscaled to the visual frame's resolution, the crop
//! is located inside the visual frame by normalized cross-correlation, and the
//! matching window is cut from the upscaled matrix.

pub mod matching;
pub mod resample;

use ndarray::s;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{DEFAULT_MIN_MATCH_SCORE, MATCH_SCORE_UNCHECKED};
use crate::error::{Result, ThermoError};
use crate::frame::{AlignedThermalPatch, PixelGrid, RawThermalMatrix};

pub use matching::{correlation_surface, match_template};
pub use resample::resample_bicubic;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Locations scoring below this are rejected as ambiguous. Scores lie
    /// in [-1, 1], so -1 accepts any best location.
    #[serde(default = "default_min_match_score")]
    pub min_match_score: f64,
}

fn default_min_match_score() -> f64 {
    DEFAULT_MIN_MATCH_SCORE
}

impl RegistrationConfig {
    /// Accept the best location whatever its score.
    pub fn unchecked() -> Self {
        Self {
            min_match_score: MATCH_SCORE_UNCHECKED,
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            min_match_score: default_min_match_score(),
        }
    }
}

/// Cut the temperatures under `crop` out of `raw`.
///
/// `full` is the visual frame the crop was taken from. Both images are
/// matched on intensity, so gray and color inputs may be mixed.
pub fn register(
    raw: &RawThermalMatrix,
    full: &PixelGrid,
    crop: &PixelGrid,
    config: &RegistrationConfig,
) -> Result<AlignedThermalPatch> {
    let (full_h, full_w) = (full.height(), full.width());
    let (crop_h, crop_w) = (crop.height(), crop.width());

    if crop_h == 0 || crop_w == 0 || full_h == 0 || full_w == 0 {
        return Err(ThermoError::InputShape(format!(
            "Cannot register an empty image (crop {crop_w}x{crop_h}, frame {full_w}x{full_h})"
        )));
    }
    if crop_h > full_h || crop_w > full_w {
        return Err(ThermoError::InputShape(format!(
            "Crop {crop_w}x{crop_h} exceeds frame {full_w}x{full_h}"
        )));
    }

    let location = match_template(&full.to_intensity(), &crop.to_intensity())?;
    debug!(
        x = location.x,
        y = location.y,
        score = location.score,
        "Located crop in visual frame"
    );

    let threshold = config.min_match_score;
    if location.score < threshold {
        warn!(
            score = location.score,
            threshold, "Crop location is ambiguous"
        );
        return Err(ThermoError::RegistrationAmbiguous {
            score: location.score,
            threshold,
        });
    }

    let upscaled = resample_bicubic(&raw.data, full_h, full_w)?;
    let data = upscaled
        .slice(s![
            location.y..location.y + crop_h,
            location.x..location.x + crop_w
        ])
        .to_owned();

    Ok(AlignedThermalPatch { data, location })
}
