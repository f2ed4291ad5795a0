//! Property and scenario tests for the pixel pipeline
//!
//! These run the public stage functions on synthetic buffers and check the
//! guarantees every caller relies on.

use trimbg::{
    calibrate_threshold, classify_pixels, estimate_background_color,
    pipeline::SMOOTHING_RADIUS, remove_background, smooth_edges, Color, Dimensions, Threshold,
};

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    [rgb[0], rgb[1], rgb[2], 255].repeat((width * height) as usize)
}

fn set_rgb(pixels: &mut [u8], width: u32, x: u32, y: u32, rgb: [u8; 3]) {
    let offset = ((y * width + x) * 4) as usize;
    pixels[offset..offset + 3].copy_from_slice(&rgb);
}

fn alpha_at(pixels: &[u8], width: u32, x: u32, y: u32) -> u8 {
    pixels[((y * width + x) * 4 + 3) as usize]
}

/// Deterministic pseudo-random RGB noise
fn noise(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        for _ in 0..3 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            pixels.push((state >> 24) as u8);
        }
        pixels.push(255);
    }
    pixels
}

/// White square image with a black 4x4 block starting at `start` on both axes
fn white_with_black_square(size: u32, start: u32) -> Vec<u8> {
    let mut pixels = solid(size, size, [255, 255, 255]);
    for y in start..start + 4 {
        for x in start..start + 4 {
            set_rgb(&mut pixels, size, x, y, [0, 0, 0]);
        }
    }
    pixels
}

#[test]
fn test_white_background_black_square_scenario() {
    // 28x28 keeps the block (12..=15) out of every 10x10 corner window
    let (size, start) = (28, 12);
    let mut pixels = white_with_black_square(size, start);
    let original = pixels.clone();
    let report = remove_background(&mut pixels, size, size).unwrap();

    assert_eq!(report.background, Color::new(255, 255, 255));
    // one of the 79 sampled distances is non-zero
    assert_eq!(report.threshold.value(), Threshold::MIN);

    let block = start..start + 4;
    let near_block = start - 2..start + 6;
    let interior = 2..size - 2;

    for y in 0..size {
        for x in 0..size {
            let alpha = alpha_at(&pixels, size, x, y);
            if block.contains(&x) && block.contains(&y) {
                assert_eq!(alpha, 255, "black pixel ({x},{y}) must stay opaque");
            } else if near_block.contains(&x)
                && near_block.contains(&y)
                && interior.contains(&x)
                && interior.contains(&y)
            {
                assert!(
                    alpha > 0 && alpha < 255,
                    "white pixel ({x},{y}) next to the block should be partially transparent, got {alpha}"
                );
            } else {
                assert_eq!(alpha, 0, "white pixel ({x},{y}) away from the block must be transparent");
            }
        }
    }

    // 25-pixel box means with 1, 4 and 6 black pixels in the window
    assert_eq!(alpha_at(&pixels, size, start - 2, start - 2), 10);
    assert_eq!(alpha_at(&pixels, size, start - 1, start - 1), 41);
    assert_eq!(alpha_at(&pixels, size, start - 1, start), 61);

    for (before, after) in original.chunks_exact(4).zip(pixels.chunks_exact(4)) {
        assert_eq!(before[..3], after[..3]);
    }
}

#[test]
fn test_corner_windows_cover_small_images_entirely() {
    // At 20x20 the four mirrored windows tile the image, so the block is sampled
    let mut pixels = white_with_black_square(20, 8);
    let report = remove_background(&mut pixels, 20, 20).unwrap();

    // 384 white and 16 black samples: 255 * 384 / 400 = 244.8
    assert_eq!(report.background, Color::new(245, 245, 245));
    assert_eq!(report.threshold.value(), Threshold::MIN);

    // sqrt(300) / 30 * 255 = 147.2 on border pixels the smoother never visits
    assert_eq!(alpha_at(&pixels, 20, 0, 0), 147);
    assert_eq!(alpha_at(&pixels, 20, 19, 19), 147);
    for y in 8..12 {
        for x in 8..12 {
            assert_eq!(alpha_at(&pixels, 20, x, y), 255);
        }
    }
}

#[test]
fn test_minimum_size_image() {
    let mut pixels = noise(10, 10, 7);
    let report = remove_background(&mut pixels, 10, 10).unwrap();
    assert_eq!(report.dimensions, Dimensions::new(10, 10));

    // Every pixel is inside all four corner windows
    let mut sums = [0u32; 3];
    for pixel in noise(10, 10, 7).chunks_exact(4) {
        for (sum, &channel) in sums.iter_mut().zip(pixel) {
            *sum += u32::from(channel);
        }
    }
    let expected = sums.map(|s| (f64::from(s) / 100.0).round() as u8);
    assert_eq!(report.background, Color::from(expected));
}

#[test]
fn test_threshold_always_in_range() {
    let sizes = [(10, 10), (17, 31), (64, 48)];
    for (seed, &(width, height)) in sizes.iter().enumerate() {
        let pixels = noise(width, height, seed as u32 + 1);
        let dims = Dimensions::new(width, height);
        let background = estimate_background_color(&pixels, dims);
        let threshold = calibrate_threshold(&pixels, background, dims);
        assert!(
            (Threshold::MIN..=Threshold::MAX).contains(&threshold.value()),
            "threshold {} out of range for {width}x{height}",
            threshold.value()
        );
    }

    // Background far from every sampled pixel pins the upper clamp
    let pixels = solid(20, 20, [0, 0, 0]);
    let threshold = calibrate_threshold(&pixels, Color::new(255, 255, 255), Dimensions::new(20, 20));
    assert_eq!(threshold.value(), Threshold::MAX);
}

#[test]
fn test_uniform_image_fully_transparent() {
    for rgb in [[0, 0, 0], [255, 255, 255], [12, 200, 99]] {
        let mut pixels = solid(16, 12, rgb);
        let report = remove_background(&mut pixels, 16, 12).unwrap();
        assert_eq!(report.background, Color::from(rgb));
        assert!(pixels.chunks_exact(4).all(|p| p[3] == 0));
    }
}

#[test]
fn test_distance_equal_to_threshold_stays_opaque() {
    // sqrt(30^2) is exactly the lower clamp
    let mut pixels = solid(30, 30, [0, 0, 0]);
    set_rgb(&mut pixels, 30, 15, 15, [30, 0, 0]);
    set_rgb(&mut pixels, 30, 16, 15, [0, 18, 24]);

    let report = remove_background(&mut pixels, 30, 30).unwrap();
    assert_eq!(report.background, Color::new(0, 0, 0));
    assert_eq!(report.threshold.value(), 30.0);
    assert_eq!(alpha_at(&pixels, 30, 15, 15), 255);
    assert_eq!(alpha_at(&pixels, 30, 16, 15), 255);
}

#[test]
fn test_smoothing_idempotent_on_opaque_regions() {
    let mut pixels = noise(24, 24, 3);
    let before = pixels.clone();
    smooth_edges(&mut pixels, Dimensions::new(24, 24), SMOOTHING_RADIUS);
    assert_eq!(pixels, before);
    smooth_edges(&mut pixels, Dimensions::new(24, 24), SMOOTHING_RADIUS);
    assert_eq!(pixels, before);
}

#[test]
fn test_smoothing_leaves_border_band_untouched() {
    let (width, height) = (32, 20);
    let dims = Dimensions::new(width, height);
    let mut pixels = noise(width, height, 11);

    let background = estimate_background_color(&pixels, dims);
    let threshold = calibrate_threshold(&pixels, background, dims);
    classify_pixels(&mut pixels, background, threshold, dims);
    let classified = pixels.clone();
    smooth_edges(&mut pixels, dims, SMOOTHING_RADIUS);

    let r = SMOOTHING_RADIUS;
    for y in 0..height {
        for x in 0..width {
            let border = x < r || y < r || x >= width - r || y >= height - r;
            if border {
                assert_eq!(
                    alpha_at(&pixels, width, x, y),
                    alpha_at(&classified, width, x, y),
                    "border pixel ({x},{y}) changed"
                );
            }
        }
    }
}

#[test]
fn test_classification_only_lowers_alpha_of_close_pixels() {
    let dims = Dimensions::new(40, 40);
    let mut pixels = noise(40, 40, 5);
    let background = estimate_background_color(&pixels, dims);
    let threshold = calibrate_threshold(&pixels, background, dims);
    classify_pixels(&mut pixels, background, threshold, dims);

    for pixel in pixels.chunks_exact(4) {
        let distance = trimbg::color_distance(pixel[0], pixel[1], pixel[2], background);
        if distance >= threshold.value() {
            assert_eq!(pixel[3], 255);
        } else {
            assert_eq!(pixel[3], trimbg::pipeline::ramp_alpha(distance, threshold));
        }
    }
}
