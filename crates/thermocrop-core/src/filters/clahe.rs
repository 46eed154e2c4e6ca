use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CLAHE_CLIP_LIMIT, DEFAULT_CLAHE_TILES, INTENSITY_LEVELS};
use crate::frame::Frame;

/// Parameters for contrast-limited adaptive histogram equalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaheConfig {
    /// When false, segmentation thresholds the blurred image directly.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Histogram clip limit, as a multiple of the mean bin height of a tile.
    #[serde(default = "default_clip_limit")]
    pub clip_limit: f32,
    /// Number of tiles along each axis.
    #[serde(default = "default_tiles")]
    pub tiles: usize,
}

fn default_enabled() -> bool {
    true
}
fn default_clip_limit() -> f32 {
    DEFAULT_CLAHE_CLIP_LIMIT
}
fn default_tiles() -> usize {
    DEFAULT_CLAHE_TILES
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clip_limit: DEFAULT_CLAHE_CLIP_LIMIT,
            tiles: DEFAULT_CLAHE_TILES,
        }
    }
}

impl ClaheConfig {
    /// Default parameters with the step switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Equalize local contrast over a grid of tiles.
///
/// Each tile gets its own clipped-histogram lookup table; pixels are mapped by
/// bilinear interpolation between the four nearest tile tables so tile seams
/// do not show. Frames smaller than the tile grid use one tile per pixel
/// along the short axis.
pub fn clahe(frame: &Frame, config: &ClaheConfig) -> Frame {
    let (h, w) = frame.data.dim();
    if h == 0 || w == 0 || config.tiles == 0 {
        return frame.clone();
    }

    let tiles_x = config.tiles.min(w);
    let tiles_y = config.tiles.min(h);
    let tile_w = w / tiles_x;
    let tile_h = h / tiles_y;

    let mut maps = vec![[0u8; INTENSITY_LEVELS]; tiles_x * tiles_y];

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = if tx == tiles_x - 1 { w } else { x0 + tile_w };
            let y1 = if ty == tiles_y - 1 { h } else { y0 + tile_h };

            let mut hist = [0u32; INTENSITY_LEVELS];
            for row in y0..y1 {
                for col in x0..x1 {
                    hist[frame.data[[row, col]] as usize] += 1;
                }
            }

            let tile_pixels = ((x1 - x0) * (y1 - y0)) as u32;
            maps[ty * tiles_x + tx] = tile_lut(&mut hist, tile_pixels, config.clip_limit);
        }
    }

    let mut result = Array2::<u8>::zeros((h, w));
    let tw_f = tile_w as f32;
    let th_f = tile_h as f32;

    for row in 0..h {
        let fy = (row as f32 + 0.5) / th_f - 0.5;
        let ty0 = (fy.floor() as i64).clamp(0, tiles_y as i64 - 1) as usize;
        let ty1 = (fy.floor() as i64 + 1).clamp(0, tiles_y as i64 - 1) as usize;
        let ay = (fy - fy.floor()).clamp(0.0, 1.0);

        for col in 0..w {
            let fx = (col as f32 + 0.5) / tw_f - 0.5;
            let tx0 = (fx.floor() as i64).clamp(0, tiles_x as i64 - 1) as usize;
            let tx1 = (fx.floor() as i64 + 1).clamp(0, tiles_x as i64 - 1) as usize;
            let ax = (fx - fx.floor()).clamp(0.0, 1.0);

            let level = frame.data[[row, col]] as usize;
            let v00 = maps[ty0 * tiles_x + tx0][level] as f32;
            let v10 = maps[ty0 * tiles_x + tx1][level] as f32;
            let v01 = maps[ty1 * tiles_x + tx0][level] as f32;
            let v11 = maps[ty1 * tiles_x + tx1][level] as f32;

            let top = v00 * (1.0 - ax) + v10 * ax;
            let bottom = v01 * (1.0 - ax) + v11 * ax;
            let val = top * (1.0 - ay) + bottom * ay;

            result[[row, col]] = val.round().clamp(0.0, 255.0) as u8;
        }
    }

    Frame::new(result)
}

/// Clip the histogram, spread the excess evenly, and build the CDF mapping.
fn tile_lut(
    hist: &mut [u32; INTENSITY_LEVELS],
    tile_pixels: u32,
    clip_limit: f32,
) -> [u8; INTENSITY_LEVELS] {
    let bins = INTENSITY_LEVELS as u32;
    let clip = ((clip_limit * tile_pixels as f32 / bins as f32) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    let per_bin = excess / bins;
    let remainder = (excess % bins) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if i < remainder {
            *bin += 1;
        }
    }

    let scale = (INTENSITY_LEVELS - 1) as f32 / tile_pixels.max(1) as f32;
    let mut lut = [0u8; INTENSITY_LEVELS];
    let mut cdf = 0u32;
    for (i, &count) in hist.iter().enumerate() {
        cdf += count;
        lut[i] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
