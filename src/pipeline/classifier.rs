//! Per-pixel alpha classification against the background color

use crate::{
    types::{Color, Dimensions, Threshold},
    utils::color_distance,
};

/// Alpha for a pixel at `distance` from the background, given `distance < threshold`.
///
/// Linear ramp from 0 at distance 0 towards 255 at the threshold, converted to a
/// byte with round-half-to-even.
#[inline]
#[must_use]
pub fn ramp_alpha(distance: f64, threshold: Threshold) -> u8 {
    let alpha = (distance / threshold.value() * 255.0).clamp(0.0, 255.0);
    alpha.round_ties_even() as u8
}

/// Rewrite alpha for every pixel closer to `background` than `threshold`.
///
/// The comparison is strict: a pixel exactly at the threshold keeps its alpha.
/// Color channels are never written.
pub fn classify_pixels(
    pixels: &mut [u8],
    background: Color,
    threshold: Threshold,
    dimensions: Dimensions,
) {
    let pixel_count = dimensions.pixel_count().unwrap_or(usize::MAX);

    for pixel in pixels.chunks_exact_mut(4).take(pixel_count) {
        if let [r, g, b, alpha] = pixel {
            let distance = color_distance(*r, *g, *b, background);
            if distance < threshold.value() {
                *alpha = ramp_alpha(distance, threshold);
            }
        }
    }
}
