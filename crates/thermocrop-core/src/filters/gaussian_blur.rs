use ndarray::{Array2, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::Frame;

/// Blur a frame with a square Gaussian kernel of side `kernel_size` using
/// separable 1D convolution. Borders are replicated; output is rounded back
/// to 8 bits.
pub fn gaussian_blur(frame: &Frame, kernel_size: usize) -> Frame {
    let data = frame.data.mapv(|v| v as f32);
    let blurred = gaussian_blur_array(&data, kernel_size);
    Frame::new(blurred.mapv(|v| v.round().clamp(0.0, 255.0) as u8))
}

/// Apply Gaussian blur to a raw array.
pub fn gaussian_blur_array(data: &Array2<f32>, kernel_size: usize) -> Array2<f32> {
    if data.is_empty() || kernel_size < 2 {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(kernel_size);
    let row_pass = convolve_rows(data, &kernel);
    let transposed = row_pass.t().to_owned();
    convolve_rows(&transposed, &kernel).t().to_owned()
}

/// Sigma for a given kernel size, using the usual `0.3*((k-1)*0.5 - 1) + 0.8`
/// rule so a 5x5 kernel gets sigma 1.1.
pub fn sigma_for_kernel(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn make_gaussian_kernel(kernel_size: usize) -> Vec<f32> {
    // Even sizes are widened to the next odd size so the kernel stays centered.
    let size = kernel_size | 1;
    let radius = size / 2;
    let sigma = sigma_for_kernel(size);
    let s2 = 2.0 * sigma * sigma;
    let mut kernel = vec![0.0f32; size];
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

fn convolve_row(src: &[f32], dst: &mut [f32], kernel: &[f32]) {
    let w = src.len();
    let radius = kernel.len() / 2;
    for (col, out) in dst.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_col =
                (col as isize + ki as isize - radius as isize).clamp(0, w as isize - 1) as usize;
            sum += src[src_col] * kv;
        }
        *out = sum;
    }
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut out)| {
                let src: Vec<f32> = data.row(row).to_vec();
                let mut buf = vec![0.0f32; w];
                convolve_row(&src, &mut buf, kernel);
                for (o, v) in out.iter_mut().zip(buf) {
                    *o = v;
                }
            });
    } else {
        let mut buf = vec![0.0f32; w];
        for row in 0..h {
            let src: Vec<f32> = data.row(row).to_vec();
            convolve_row(&src, &mut buf, kernel);
            for (col, &v) in buf.iter().enumerate() {
                result[[row, col]] = v;
            }
        }
    }

    result
}
