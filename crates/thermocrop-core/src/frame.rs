use ndarray::Array2;

use crate::consts::{HUE_RANGE, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};

/// Foreground mask; `true` marks subject pixels. Same shape as its source.
pub type Mask = Array2<bool>;

/// A single-channel 8-bit intensity image.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u8>,
}

impl Frame {
    pub fn new(data: Array2<u8>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 8-bit RGB image composed of separate channel frames.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorFrame {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
}

impl ColorFrame {
    pub fn width(&self) -> usize {
        self.red.width()
    }

    pub fn height(&self) -> usize {
        self.red.height()
    }

    /// Collapse to intensity with BT.601 weights, rounded to the nearest level.
    pub fn luminance(&self) -> Frame {
        let (h, w) = self.red.data.dim();
        let mut data = Array2::<u8>::zeros((h, w));

        for row in 0..h {
            for col in 0..w {
                let y = LUMINANCE_R * self.red.data[[row, col]] as f32
                    + LUMINANCE_G * self.green.data[[row, col]] as f32
                    + LUMINANCE_B * self.blue.data[[row, col]] as f32;
                data[[row, col]] = y.round().clamp(0.0, 255.0) as u8;
            }
        }

        Frame::new(data)
    }

    /// Hue channel on the half-degree scale [0, 180): red = 0, green = 60,
    /// blue = 120. Achromatic pixels get hue 0.
    pub fn hue(&self) -> Array2<f32> {
        let (h, w) = self.red.data.dim();
        let mut hue = Array2::<f32>::zeros((h, w));

        for row in 0..h {
            for col in 0..w {
                hue[[row, col]] = rgb_to_hue(
                    self.red.data[[row, col]],
                    self.green.data[[row, col]],
                    self.blue.data[[row, col]],
                );
            }
        }

        hue
    }
}

fn rgb_to_hue(r: u8, g: u8, b: u8) -> f32 {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;
    if diff <= 0.0 {
        return 0.0;
    }

    let degrees = if max == r {
        60.0 * (g - b) / diff
    } else if max == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };

    let half = degrees / 2.0;
    if half >= HUE_RANGE {
        half - HUE_RANGE
    } else {
        half
    }
}

/// Either kind of decoded 8-bit image the pipelines accept.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelGrid {
    Gray(Frame),
    Color(ColorFrame),
}

impl PixelGrid {
    pub fn width(&self) -> usize {
        match self {
            Self::Gray(f) => f.width(),
            Self::Color(c) => c.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Gray(f) => f.height(),
            Self::Color(c) => c.height(),
        }
    }

    /// Single-channel intensity view. Gray grids are returned as-is.
    pub fn to_intensity(&self) -> Frame {
        match self {
            Self::Gray(f) => f.clone(),
            Self::Color(c) => c.luminance(),
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, Self::Color(_))
    }
}

/// Temperature grid (°C) at the thermal sensor's native resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct RawThermalMatrix {
    pub data: Array2<f64>,
}

impl RawThermalMatrix {
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Location of a crop inside a full frame, as found by template matching.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MatchLocation {
    pub x: usize,
    pub y: usize,
    /// Zero-mean normalized cross-correlation at the location, in [-1, 1].
    pub score: f64,
}

/// Temperature grid cut from the upscaled sensor matrix; its shape equals the
/// crop's shape in visual-resolution pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedThermalPatch {
    pub data: Array2<f64>,
    pub location: MatchLocation,
}

impl AlignedThermalPatch {
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}
