use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationConfig, PixelModel, TableChoice};
use crate::metadata::MetadataConfig;
use crate::registration::RegistrationConfig;
use crate::segmentation::SegmentationConfig;

/// Every tunable of an analysis run. Each section falls back to its defaults
/// when missing from a config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub radiometric: RadiometricConfig,
}

/// How temperatures are reconstructed for a sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Read temperatures back out of the rendered palette image.
    #[default]
    Palette,
    /// Use the camera's radiometric matrix, registered onto the crop.
    Radiometric,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Palette => write!(f, "Palette"),
            Self::Radiometric => write!(f, "Radiometric"),
        }
    }
}

/// Which pixel model the palette strategy applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteModel {
    /// Hue inversion for color crops, linear intensity for gray ones.
    #[default]
    Auto,
    LinearIntensity,
    /// Falls back to linear intensity when the crop has no color.
    HueInversion,
}

impl PaletteModel {
    /// The model that can actually be applied to a crop.
    pub fn resolve(self, is_color: bool) -> PixelModel {
        match (self, is_color) {
            (Self::LinearIntensity, _) => PixelModel::LinearIntensity,
            (Self::Auto | Self::HueInversion, true) => PixelModel::HueInversion,
            (Self::Auto | Self::HueInversion, false) => PixelModel::LinearIntensity,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default)]
    pub model: PaletteModel,
    #[serde(default)]
    pub table: TableChoice,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RadiometricConfig {
    /// Aggregate only the crop's foreground instead of the whole patch.
    #[serde(default)]
    pub segment_patch: bool,
}
