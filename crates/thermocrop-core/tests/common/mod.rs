#![allow(dead_code)]

use ndarray::Array2;

use thermocrop_core::frame::{ColorFrame, Frame, PixelGrid, RawThermalMatrix};

/// Gray frame with a uniform background and one bright square.
///
/// The square covers rows/cols `start..start + side`.
pub fn square_frame(size: usize, start: usize, side: usize, bg: u8, fg: u8) -> Frame {
    let mut data = Array2::from_elem((size, size), bg);
    for r in start..start + side {
        for c in start..start + side {
            data[[r, c]] = fg;
        }
    }
    Frame::new(data)
}

pub fn uniform_frame(h: usize, w: usize, value: u8) -> Frame {
    Frame::new(Array2::from_elem((h, w), value))
}

/// Non-repeating texture: every window of a few pixels is unique, so
/// template matching has a single exact answer.
pub fn patterned_frame(h: usize, w: usize) -> Frame {
    Frame::new(Array2::from_shape_fn((h, w), |(r, c)| {
        ((r * 37 + c * 91 + r * c * 13) % 251) as u8
    }))
}

pub fn uniform_color(h: usize, w: usize, rgb: [u8; 3]) -> ColorFrame {
    ColorFrame {
        red: uniform_frame(h, w, rgb[0]),
        green: uniform_frame(h, w, rgb[1]),
        blue: uniform_frame(h, w, rgb[2]),
    }
}

/// Smooth temperature field around 25 °C.
pub fn thermal_field(h: usize, w: usize) -> RawThermalMatrix {
    RawThermalMatrix::new(Array2::from_shape_fn((h, w), |(r, c)| {
        25.0 + 0.1 * r as f64 - 0.05 * c as f64 + ((r + 2 * c) as f64 * 0.3).sin()
    }))
}

pub fn gray(frame: Frame) -> PixelGrid {
    PixelGrid::Gray(frame)
}

/// Largest absolute element-wise difference.
pub fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    assert_eq!(a.dim(), b.dim(), "shape mismatch");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
