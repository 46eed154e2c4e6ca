use ndarray::{Array2, Axis};
use rayon::prelude::*;

use crate::consts::{BICUBIC_A, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{Result, ThermoError};

/// Source taps and weights for one output coordinate.
#[derive(Clone, Copy, Debug)]
struct CubicTaps {
    index: [usize; 4],
    weight: [f64; 4],
}

/// Keys cubic convolution weights for fractional offset `t` in [0, 1).
fn cubic_weights(t: f64) -> [f64; 4] {
    let a = BICUBIC_A;
    let w0 = ((a * (t + 1.0) - 5.0 * a) * (t + 1.0) + 8.0 * a) * (t + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let u = 1.0 - t;
    let w2 = ((a + 2.0) * u - (a + 3.0)) * u * u + 1.0;
    let w3 = 1.0 - w0 - w1 - w2;
    [w0, w1, w2, w3]
}

/// Precompute taps for mapping `src_len` samples onto `dst_len` samples with
/// half-pixel-centre alignment. Out-of-range taps repeat the edge sample.
fn axis_taps(src_len: usize, dst_len: usize) -> Vec<CubicTaps> {
    let scale = src_len as f64 / dst_len as f64;
    let last = src_len as i64 - 1;

    (0..dst_len)
        .map(|d| {
            let pos = (d as f64 + 0.5) * scale - 0.5;
            let base = pos.floor();
            let t = pos - base;
            let base = base as i64;
            let mut index = [0usize; 4];
            for (k, slot) in index.iter_mut().enumerate() {
                *slot = (base - 1 + k as i64).clamp(0, last) as usize;
            }
            CubicTaps {
                index,
                weight: cubic_weights(t),
            }
        })
        .collect()
}

fn apply_taps(line: &[f64], taps: &CubicTaps) -> f64 {
    taps.index
        .iter()
        .zip(taps.weight.iter())
        .map(|(&i, &w)| line[i] * w)
        .sum()
}

/// Resample each row of `data` to `taps.len()` columns.
fn resample_rows(data: &Array2<f64>, taps: &[CubicTaps]) -> Array2<f64> {
    let (h, _) = data.dim();
    let out_w = taps.len();
    let mut out = Array2::<f64>::zeros((h, out_w));

    let fill = |row: usize, mut dst: ndarray::ArrayViewMut1<f64>| {
        let src = data.row(row).to_vec();
        for (o, t) in dst.iter_mut().zip(taps) {
            *o = apply_taps(&src, t);
        }
    };

    if h * out_w >= PARALLEL_PIXEL_THRESHOLD {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, dst)| fill(row, dst));
    } else {
        for (row, dst) in out.axis_iter_mut(Axis(0)).enumerate() {
            fill(row, dst);
        }
    }

    out
}

/// Upscale (or downscale) a matrix to `out_h` x `out_w` with bicubic
/// interpolation.
///
/// Kernel weights sum to one and edges are replicated, so a constant matrix
/// resamples to the same constant everywhere, borders included.
pub fn resample_bicubic(data: &Array2<f64>, out_h: usize, out_w: usize) -> Result<Array2<f64>> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return Err(ThermoError::InputShape(format!(
            "Cannot resample an empty matrix ({w}x{h})"
        )));
    }
    if out_h == 0 || out_w == 0 {
        return Err(ThermoError::InputShape(format!(
            "Resample target must be positive, got {out_w}x{out_h}"
        )));
    }

    let col_taps = axis_taps(w, out_w);
    let row_taps = axis_taps(h, out_h);

    // Horizontal pass, then the vertical pass on the transposed result.
    let horizontal = resample_rows(data, &col_taps);
    let transposed = horizontal.t().to_owned();
    let vertical = resample_rows(&transposed, &row_taps);
    Ok(vertical.t().to_owned())
}
