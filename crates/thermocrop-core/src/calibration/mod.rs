//! Temperature scales per ambient preset, and the pixel-to-temperature models
//! that use them.

pub mod model;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ThermoError};

pub use model::{hue_to_temp, intensity_to_temp, PixelModel};

/// Temperature range (°C) a palette spans. Always `min_temp < max_temp`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScale")]
pub struct CalibrationScale {
    min_temp: f64,
    max_temp: f64,
}

#[derive(Deserialize)]
struct RawScale {
    min_temp: f64,
    max_temp: f64,
}

impl TryFrom<RawScale> for CalibrationScale {
    type Error = ThermoError;

    fn try_from(raw: RawScale) -> Result<Self> {
        CalibrationScale::new(raw.min_temp, raw.max_temp)
    }
}

impl CalibrationScale {
    pub fn new(min_temp: f64, max_temp: f64) -> Result<Self> {
        let ordered = min_temp.is_finite() && max_temp.is_finite() && min_temp < max_temp;
        if !ordered {
            return Err(ThermoError::InvalidCalibration {
                min: min_temp,
                max: max_temp,
            });
        }
        Ok(Self { min_temp, max_temp })
    }

    /// Built-in constant scales; bounds are known to be ordered.
    const fn fixed(min_temp: f64, max_temp: f64) -> Self {
        Self { min_temp, max_temp }
    }

    pub fn min_temp(&self) -> f64 {
        self.min_temp
    }

    pub fn max_temp(&self) -> f64 {
        self.max_temp
    }

    pub fn span(&self) -> f64 {
        self.max_temp - self.min_temp
    }
}

/// Scale picked for a preset token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedScale {
    pub scale: CalibrationScale,
    /// `false` when the token was not in the table and the default was used.
    pub matched: bool,
}

/// Mapping from ambient-preset token to scale, plus a default for unknown tokens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    pub default: CalibrationScale,
    #[serde(default)]
    pub presets: BTreeMap<String, CalibrationScale>,
}

impl CalibrationTable {
    pub fn new(default: CalibrationScale) -> Self {
        Self {
            default,
            presets: BTreeMap::new(),
        }
    }

    pub fn with_preset(mut self, token: impl Into<String>, scale: CalibrationScale) -> Self {
        self.presets.insert(token.into(), scale);
        self
    }

    /// Scales fitted to the rainbow palette exported by the camera app.
    pub fn palette() -> Self {
        Self::new(CalibrationScale::fixed(20.0, 40.0))
            .with_preset("21", CalibrationScale::fixed(16.8, 23.0))
            .with_preset("27", CalibrationScale::fixed(25.7, 31.8))
            .with_preset("35", CalibrationScale::fixed(28.9, 35.0))
            .with_preset("45", CalibrationScale::fixed(37.0, 49.1))
    }

    /// Wider scales used when reading grayscale intensities directly.
    pub fn manual() -> Self {
        Self::new(CalibrationScale::fixed(20.0, 40.0))
            .with_preset("21", CalibrationScale::fixed(15.0, 25.0))
            .with_preset("27", CalibrationScale::fixed(20.0, 35.0))
            .with_preset("35", CalibrationScale::fixed(25.0, 45.0))
            .with_preset("45", CalibrationScale::fixed(35.0, 55.0))
    }

    /// Look up a token. Unknown tokens resolve to the default scale.
    pub fn resolve(&self, token: &str) -> ResolvedScale {
        match self.presets.get(token) {
            Some(scale) => ResolvedScale {
                scale: *scale,
                matched: true,
            },
            None => {
                debug!(token, "No calibration preset for token, using default scale");
                ResolvedScale {
                    scale: self.default,
                    matched: false,
                }
            }
        }
    }
}

/// Both independently configurable calibration tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default = "CalibrationTable::palette")]
    pub palette: CalibrationTable,
    #[serde(default = "CalibrationTable::manual")]
    pub manual: CalibrationTable,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            palette: CalibrationTable::palette(),
            manual: CalibrationTable::manual(),
        }
    }
}

/// Which of the two tables a pipeline reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableChoice {
    /// Palette table for hue inversion, manual table for linear intensity.
    #[default]
    ByModel,
    Palette,
    Manual,
}

impl std::fmt::Display for TableChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByModel => write!(f, "By Model"),
            Self::Palette => write!(f, "Palette"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

impl CalibrationConfig {
    pub fn table_for(&self, choice: TableChoice, model: PixelModel) -> &CalibrationTable {
        match (choice, model) {
            (TableChoice::Palette, _) => &self.palette,
            (TableChoice::Manual, _) => &self.manual,
            (TableChoice::ByModel, PixelModel::HueInversion) => &self.palette,
            (TableChoice::ByModel, PixelModel::LinearIntensity) => &self.manual,
        }
    }
}
