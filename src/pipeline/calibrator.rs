//! Adaptive threshold calibration

use super::{CALIBRATION_PERCENTILE, CALIBRATION_STRIDE};
use crate::{
    types::{Color, Dimensions, Threshold},
    utils::color_distance,
};

/// Derive the distance cutoff for one image.
///
/// Every [`CALIBRATION_STRIDE`]th pixel (starting with the first) contributes its
/// distance to `background`. The distance at rank `floor(0.25 * count)` of the
/// sorted samples, clamped to `[30, 80]`, becomes the threshold.
#[must_use]
pub fn calibrate_threshold(pixels: &[u8], background: Color, dimensions: Dimensions) -> Threshold {
    let pixel_count = dimensions.pixel_count().unwrap_or(usize::MAX);

    let mut distances: Vec<f64> = pixels
        .chunks_exact(4)
        .take(pixel_count)
        .step_by(CALIBRATION_STRIDE)
        .map(|pixel| match *pixel {
            [r, g, b, _] => color_distance(r, g, b, background),
            _ => 0.0,
        })
        .collect();

    distances.sort_unstable_by(f64::total_cmp);

    let rank = (distances.len() as f64 * CALIBRATION_PERCENTILE).floor() as usize;
    let candidate = distances.get(rank).copied().unwrap_or(0.0);

    Threshold::clamped(candidate)
}
