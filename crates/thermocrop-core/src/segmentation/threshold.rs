use crate::consts::INTENSITY_LEVELS;
use crate::frame::Frame;

/// 256-bin intensity histogram of a frame.
pub fn histogram(frame: &Frame) -> [u64; INTENSITY_LEVELS] {
    let mut histogram = [0u64; INTENSITY_LEVELS];
    for &v in frame.data.iter() {
        histogram[v as usize] += 1;
    }
    histogram
}

/// Otsu's thresholding: find the level that minimizes intra-class variance
/// (equivalently, maximizes between-class variance). Pixels strictly above
/// the returned level are foreground.
///
/// Returns `None` when no level splits the histogram into two non-empty
/// classes, i.e. the frame holds a single intensity.
pub fn otsu_threshold(frame: &Frame) -> Option<u8> {
    let histogram = histogram(frame);
    let total = frame.data.len() as f64;
    if total == 0.0 {
        return None;
    }

    let mut sum_all: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_all += i as f64 * count as f64;
    }

    let mut weight_bg: f64 = 0.0;
    let mut sum_bg: f64 = 0.0;
    let mut best_variance = 0.0_f64;
    let mut best_level: Option<usize> = None;

    for (i, &count) in histogram.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += i as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between_variance > best_variance {
            best_variance = between_variance;
            best_level = Some(i);
        }
    }

    best_level.map(|level| level as u8)
}
