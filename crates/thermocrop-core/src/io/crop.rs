use std::str::FromStr;

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermoError};
use crate::frame::{ColorFrame, Frame, PixelGrid};

/// A rectangle in image coordinates for cropping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check the rect is non-empty and lies inside a `src_w` x `src_h` image.
    pub fn validated(&self, src_w: usize, src_h: usize) -> Result<CropRect> {
        if self.width == 0 || self.height == 0 {
            return Err(ThermoError::InputShape(
                "Crop width and height must be > 0".into(),
            ));
        }

        if self.x + self.width > src_w || self.y + self.height > src_h {
            return Err(ThermoError::InputShape(format!(
                "Crop region ({},{} {}x{}) exceeds source dimensions ({src_w}x{src_h})",
                self.x, self.y, self.width, self.height
            )));
        }

        Ok(*self)
    }
}

/// Parses `x,y,w,h`.
impl FromStr for CropRect {
    type Err = ThermoError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<usize> = s
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ThermoError::Config(format!("Invalid crop '{s}': {e}")))?;

        match parts.as_slice() {
            &[x, y, width, height] => Ok(CropRect::new(x, y, width, height)),
            _ => Err(ThermoError::Config(format!(
                "Invalid crop '{s}': expected x,y,width,height"
            ))),
        }
    }
}

fn crop_array<T: Clone>(data: &Array2<T>, rect: &CropRect) -> Array2<T> {
    data.slice(s![
        rect.y..rect.y + rect.height,
        rect.x..rect.x + rect.width
    ])
    .to_owned()
}

/// Cut a rectangular region out of a single-channel frame.
pub fn crop_frame(frame: &Frame, rect: &CropRect) -> Result<Frame> {
    let rect = rect.validated(frame.width(), frame.height())?;
    Ok(Frame::new(crop_array(&frame.data, &rect)))
}

/// Cut a rectangular region out of every channel of a color frame.
pub fn crop_color(color: &ColorFrame, rect: &CropRect) -> Result<ColorFrame> {
    let rect = rect.validated(color.width(), color.height())?;
    Ok(ColorFrame {
        red: Frame::new(crop_array(&color.red.data, &rect)),
        green: Frame::new(crop_array(&color.green.data, &rect)),
        blue: Frame::new(crop_array(&color.blue.data, &rect)),
    })
}

pub fn crop_grid(grid: &PixelGrid, rect: &CropRect) -> Result<PixelGrid> {
    match grid {
        PixelGrid::Gray(f) => crop_frame(f, rect).map(PixelGrid::Gray),
        PixelGrid::Color(c) => crop_color(c, rect).map(PixelGrid::Color),
    }
}
