//! Foreground segmentation of a cropped plant region.
//!
//! Pipeline: intensity -> 5x5 Gaussian blur -> optional contrast-limited
//! equalization -> Otsu threshold -> binary mask. A mask with fewer than
//! `min_foreground` pixels is replaced by the full region.

pub mod threshold;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_BLUR_KERNEL_SIZE, MIN_FOREGROUND_PIXELS};
use crate::error::{Result, ThermoError};
use crate::filters::clahe::{clahe, ClaheConfig};
use crate::filters::gaussian_blur::gaussian_blur;
use crate::frame::{Frame, Mask, PixelGrid};

pub use threshold::otsu_threshold;

/// Configuration for foreground segmentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Side of the square Gaussian kernel used to suppress sensor noise.
    #[serde(default = "default_blur_kernel_size")]
    pub blur_kernel_size: usize,
    /// Local contrast normalization, skipped when `contrast.enabled` is false.
    #[serde(default)]
    pub contrast: ClaheConfig,
    /// Masks smaller than this fall back to the full region.
    #[serde(default = "default_min_foreground")]
    pub min_foreground: usize,
}

fn default_blur_kernel_size() -> usize {
    DEFAULT_BLUR_KERNEL_SIZE
}
fn default_min_foreground() -> usize {
    MIN_FOREGROUND_PIXELS
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            contrast: ClaheConfig::default(),
            min_foreground: MIN_FOREGROUND_PIXELS,
        }
    }
}

/// How the final mask was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentationOutcome {
    /// Pixels above the Otsu level are foreground.
    Thresholded { threshold: u8 },
    /// Thresholding gave too few (or no meaningful) foreground pixels; every
    /// pixel of the region is foreground.
    FullRegionFallback,
}

#[derive(Clone, Debug)]
pub struct Segmentation {
    pub mask: Mask,
    pub outcome: SegmentationOutcome,
}

impl Segmentation {
    /// Number of foreground pixels in the mask.
    pub fn foreground_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    pub fn is_fallback(&self) -> bool {
        self.outcome == SegmentationOutcome::FullRegionFallback
    }
}

/// Segment a gray or color region. Color regions are reduced to luminance.
pub fn segment_region(region: &PixelGrid, config: &SegmentationConfig) -> Result<Segmentation> {
    segment_frame(&region.to_intensity(), config)
}

/// Segment a single-channel region.
pub fn segment_frame(frame: &Frame, config: &SegmentationConfig) -> Result<Segmentation> {
    let (h, w) = frame.data.dim();
    if h == 0 || w == 0 {
        return Err(ThermoError::InputShape(format!(
            "Cannot segment an empty region ({w}x{h})"
        )));
    }

    let blurred = gaussian_blur(frame, config.blur_kernel_size);
    let normalized = if config.contrast.enabled {
        clahe(&blurred, &config.contrast)
    } else {
        blurred
    };

    let Some(threshold) = otsu_threshold(&normalized) else {
        debug!(width = w, height = h, "Region has a single intensity, using full region");
        return Ok(full_region(h, w));
    };

    let mask = normalized.data.mapv(|v| v > threshold);
    let foreground = mask.iter().filter(|&&m| m).count();

    if foreground < config.min_foreground {
        debug!(
            foreground,
            min = config.min_foreground,
            "Foreground below minimum, using full region"
        );
        return Ok(full_region(h, w));
    }

    Ok(Segmentation {
        mask,
        outcome: SegmentationOutcome::Thresholded { threshold },
    })
}

fn full_region(h: usize, w: usize) -> Segmentation {
    Segmentation {
        mask: Array2::from_elem((h, w), true),
        outcome: SegmentationOutcome::FullRegionFallback,
    }
}
