//! Alpha-channel box blur that softens the classification boundary

use crate::types::Dimensions;

/// Replace the alpha of every interior, not fully opaque pixel with the rounded
/// mean alpha of its `(2 * radius + 1)^2` neighbourhood.
///
/// All means are computed from the alpha values as they were before the pass,
/// so results do not depend on scan order. Pixels closer than `radius` to any
/// border and pixels with alpha 255 are never written. Color channels are never
/// written.
pub fn smooth_edges(pixels: &mut [u8], dimensions: Dimensions, radius: u32) {
    let width = dimensions.width as usize;
    let height = dimensions.height as usize;
    let r = radius as usize;

    if width <= 2 * r || height <= 2 * r {
        return;
    }
    let Some(pixel_count) = dimensions.pixel_count() else {
        return;
    };

    let original: Vec<u8> = pixels
        .chunks_exact(4)
        .take(pixel_count)
        .map(|pixel| pixel.get(3).copied().unwrap_or(u8::MAX))
        .collect();
    if original.len() != pixel_count {
        return;
    }
    let mut smoothed = original.clone();

    let window = ((2 * r + 1) * (2 * r + 1)) as f64;

    for y in r..height - r {
        for x in r..width - r {
            let index = y * width + x;
            if original.get(index).copied().unwrap_or(u8::MAX) == u8::MAX {
                continue;
            }

            let mut sum = 0u32;
            for ny in y - r..=y + r {
                let row = ny * width;
                // Safe: x and y are at least `r` away from every border
                #[allow(clippy::indexing_slicing)]
                let span = &original[row + x - r..=row + x + r];
                sum += span.iter().map(|&a| u32::from(a)).sum::<u32>();
            }

            if let Some(slot) = smoothed.get_mut(index) {
                *slot = (f64::from(sum) / window).round() as u8;
            }
        }
    }

    for (pixel, alpha) in pixels.chunks_exact_mut(4).zip(smoothed) {
        if let [_, _, _, a] = pixel {
            *a = alpha;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_alpha(width: u32, height: u32, alpha: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 99, alpha(x, y)]);
            }
        }
        pixels
    }

    fn alpha_at(pixels: &[u8], width: u32, x: u32, y: u32) -> u8 {
        pixels[((y * width + x) * 4 + 3) as usize]
    }

    #[test]
    fn test_opaque_image_is_unchanged() {
        let mut pixels = with_alpha(12, 12, |_, _| 255);
        let before = pixels.clone();
        smooth_edges(&mut pixels, Dimensions::new(12, 12), 2);
        assert_eq!(pixels, before);
        smooth_edges(&mut pixels, Dimensions::new(12, 12), 2);
        assert_eq!(pixels, before);
    }

    #[test]
    fn test_fully_transparent_image_is_unchanged() {
        let mut pixels = with_alpha(10, 10, |_, _| 0);
        let before = pixels.clone();
        smooth_edges(&mut pixels, Dimensions::new(10, 10), 2);
        assert_eq!(pixels, before);
    }

    #[test]
    fn test_border_band_is_never_modified() {
        // checkerboard of 0/128 so every pixel is eligible
        let mut pixels = with_alpha(15, 13, |x, y| if (x + y) % 2 == 0 { 0 } else { 128 });
        let before = pixels.clone();
        smooth_edges(&mut pixels, Dimensions::new(15, 13), 2);
        for y in 0..13 {
            for x in 0..15 {
                if x < 2 || y < 2 || x >= 13 || y >= 11 {
                    assert_eq!(
                        alpha_at(&pixels, 15, x, y),
                        alpha_at(&before, 15, x, y),
                        "border pixel ({x}, {y}) changed"
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_transparent_pixel_in_opaque_field() {
        let mut pixels = with_alpha(9, 9, |x, y| if (x, y) == (4, 4) { 0 } else { 255 });
        smooth_edges(&mut pixels, Dimensions::new(9, 9), 2);
        // 24 * 255 / 25 = 244.8 -> 245
        assert_eq!(alpha_at(&pixels, 9, 4, 4), 245);
        // neighbours were opaque and stay opaque
        assert_eq!(alpha_at(&pixels, 9, 3, 4), 255);
    }

    #[test]
    fn test_reads_from_snapshot_not_partial_results() {
        // a vertical edge: columns < 5 transparent, >= 5 opaque
        let mut pixels = with_alpha(10, 10, |x, _| if x < 5 { 0 } else { 255 });
        smooth_edges(&mut pixels, Dimensions::new(10, 10), 2);
        // x = 4: window columns 2..=6 -> 2 opaque columns of 5 -> 102
        assert_eq!(alpha_at(&pixels, 10, 4, 5), 102);
        // x = 3: window columns 1..=5 -> 1 opaque column -> 51
        assert_eq!(alpha_at(&pixels, 10, 3, 5), 51);
        // x = 2: window columns 0..=4 -> all transparent
        assert_eq!(alpha_at(&pixels, 10, 2, 5), 0);
        // every row in the interior agrees, so no directional bias
        for y in 2..8 {
            assert_eq!(alpha_at(&pixels, 10, 4, y), 102);
        }
    }

    #[test]
    fn test_color_channels_untouched() {
        let mut pixels = with_alpha(10, 10, |x, _| if x < 5 { 0 } else { 255 });
        let before = pixels.clone();
        smooth_edges(&mut pixels, Dimensions::new(10, 10), 2);
        for (a, b) in before.chunks_exact(4).zip(pixels.chunks_exact(4)) {
            assert_eq!(a[..3], b[..3]);
        }
    }

    #[test]
    fn test_image_smaller_than_window_is_noop() {
        let mut pixels = with_alpha(4, 4, |_, _| 10);
        let before = pixels.clone();
        smooth_edges(&mut pixels, Dimensions::new(4, 4), 2);
        assert_eq!(pixels, before);
    }
}
