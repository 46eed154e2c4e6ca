//! Zero-mean normalized cross-correlation template matching.
//!
//! The numerator is computed for every offset at once with an FFT
//! cross-correlation; window sums for the denominator come from summed-area
//! tables. Window statistics are kept in integers, so flat windows are
//! detected exactly and score 0.

use ndarray::{Array2, ArrayView1};
use num_complex::Complex;
use rustfft::FftPlanner;
use tracing::debug;

use crate::error::{Result, ThermoError};
use crate::frame::{Frame, MatchLocation};

/// Integral image with a zero first row and column: `table[[y, x]]` is the
/// sum over `[0, y) x [0, x)`.
fn summed_area<F>(frame: &Frame, f: F) -> Array2<i64>
where
    F: Fn(u8) -> i64,
{
    let (h, w) = frame.data.dim();
    let mut table = Array2::<i64>::zeros((h + 1, w + 1));
    for row in 0..h {
        let mut running = 0i64;
        for col in 0..w {
            running += f(frame.data[[row, col]]);
            table[[row + 1, col + 1]] = table[[row, col + 1]] + running;
        }
    }
    table
}

fn window_sum(table: &Array2<i64>, y: usize, x: usize, h: usize, w: usize) -> i64 {
    table[[y + h, x + w]] - table[[y, x + w]] - table[[y + h, x]] + table[[y, x]]
}

/// Forward 2D FFT of a real array: row-wise, then column-wise.
fn fft2d(data: &Array2<f64>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    let mut result = data.mapv(|v| Complex::new(v, 0.0));

    for mut row in result.rows_mut() {
        let mut buf = row.to_vec();
        fft_row.process(&mut buf);
        row.assign(&ArrayView1::from(&buf[..]));
    }
    for mut col in result.columns_mut() {
        let mut buf = col.to_vec();
        fft_col.process(&mut buf);
        col.assign(&ArrayView1::from(&buf[..]));
    }

    result
}

/// Inverse 2D FFT, keeping the normalized real part.
fn ifft2d(data: &Array2<Complex<f64>>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    let mut work = data.clone();

    for mut col in work.columns_mut() {
        let mut buf = col.to_vec();
        ifft_col.process(&mut buf);
        col.assign(&ArrayView1::from(&buf[..]));
    }
    for mut row in work.rows_mut() {
        let mut buf = row.to_vec();
        ifft_row.process(&mut buf);
        row.assign(&ArrayView1::from(&buf[..]));
    }

    let scale = 1.0 / (h * w) as f64;
    work.mapv(|c| c.re * scale)
}

/// Normalized correlation score of `template` at every offset where it fits
/// inside `frame`. Output shape is `(H - h + 1, W - w + 1)`; values lie in
/// [-1, 1]. Offsets whose frame window (or a template) has zero variance
/// score 0.
pub fn correlation_surface(frame: &Frame, template: &Frame) -> Result<Array2<f64>> {
    let (fh, fw) = frame.data.dim();
    let (th, tw) = template.data.dim();
    if th == 0 || tw == 0 || fh == 0 || fw == 0 {
        return Err(ThermoError::InputShape(format!(
            "Cannot match a {tw}x{th} template in a {fw}x{fh} frame"
        )));
    }
    if th > fh || tw > fw {
        return Err(ThermoError::InputShape(format!(
            "Template {tw}x{th} is larger than frame {fw}x{fh}"
        )));
    }

    let n = (th * tw) as i64;
    let t_sum: i64 = template.data.iter().map(|&v| v as i64).sum();
    let t_sum_sq: i64 = template.data.iter().map(|&v| (v as i64) * (v as i64)).sum();
    // n^2 * variance of the template, exact.
    let t_var_n = (n as i128) * (t_sum_sq as i128) - (t_sum as i128) * (t_sum as i128);

    let out_h = fh - th + 1;
    let out_w = fw - tw + 1;
    if t_var_n == 0 {
        debug!("Template has zero variance, correlation is undefined everywhere");
        return Ok(Array2::zeros((out_h, out_w)));
    }

    // Zero-mean template padded to the frame size. Valid offsets never wrap.
    let t_mean = t_sum as f64 / n as f64;
    let mut padded = Array2::<f64>::zeros((fh, fw));
    for ((row, col), &v) in template.data.indexed_iter() {
        padded[[row, col]] = v as f64 - t_mean;
    }
    let image = frame.data.mapv(|v| v as f64);

    let image_fft = fft2d(&image);
    let template_fft = fft2d(&padded);
    let cross_power = ndarray::Zip::from(&image_fft)
        .and(&template_fft)
        .map_collect(|a, b| a * b.conj());
    let cross = ifft2d(&cross_power);

    let sums = summed_area(frame, |v| v as i64);
    let sums_sq = summed_area(frame, |v| (v as i64) * (v as i64));
    let t_norm = (t_var_n as f64 / n as f64).sqrt();

    let mut surface = Array2::<f64>::zeros((out_h, out_w));
    for ((y, x), score) in surface.indexed_iter_mut() {
        let s = window_sum(&sums, y, x, th, tw) as i128;
        let s2 = window_sum(&sums_sq, y, x, th, tw) as i128;
        let var_n = (n as i128) * s2 - s * s;
        if var_n <= 0 {
            continue;
        }
        let w_norm = (var_n as f64 / n as f64).sqrt();
        *score = (cross[[y, x]] / (w_norm * t_norm)).clamp(-1.0, 1.0);
    }

    Ok(surface)
}

/// Top-left corner of the best match of `template` in `frame`.
///
/// Ties resolve to the first maximum in row-major order.
pub fn match_template(frame: &Frame, template: &Frame) -> Result<MatchLocation> {
    let surface = correlation_surface(frame, template)?;
    Ok(find_peak(&surface))
}

fn find_peak(surface: &Array2<f64>) -> MatchLocation {
    let mut best = MatchLocation {
        x: 0,
        y: 0,
        score: f64::NEG_INFINITY,
    };
    for ((y, x), &score) in surface.indexed_iter() {
        if score > best.score {
            best = MatchLocation { x, y, score };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(h: usize, w: usize) -> Frame {
        Frame::new(Array2::from_shape_fn((h, w), |(r, c)| {
            ((r * 37 + c * 91 + r * c * 13) % 251) as u8
        }))
    }

    #[test]
    fn summed_area_matches_direct_sum() {
        let frame = pattern(7, 9);
        let table = summed_area(&frame, |v| v as i64);
        let direct: i64 = frame
            .data
            .slice(ndarray::s![2..5, 3..8])
            .iter()
            .map(|&v| v as i64)
            .sum();
        assert_eq!(window_sum(&table, 2, 3, 3, 5), direct);
    }

    #[test]
    fn exact_crop_scores_one() {
        let frame = pattern(30, 40);
        let crop = Frame::new(frame.data.slice(ndarray::s![5..17, 11..30]).to_owned());
        let loc = match_template(&frame, &crop).unwrap();
        assert_eq!((loc.x, loc.y), (11, 5));
        assert!((loc.score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flat_template_scores_zero() {
        let frame = pattern(20, 20);
        let crop = Frame::new(Array2::from_elem((5, 5), 42u8));
        let surface = correlation_surface(&frame, &crop).unwrap();
        assert!(surface.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn peak_prefers_first_in_row_major_order() {
        let surface = Array2::from_shape_vec((2, 3), vec![0.1, 0.9, 0.2, 0.9, 0.3, 0.9]).unwrap();
        let loc = find_peak(&surface);
        assert_eq!((loc.x, loc.y), (1, 0));
    }
}
