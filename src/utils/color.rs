//! Color distance and alpha helpers shared by the pipeline stages

use crate::types::Color;

/// Euclidean distance between an RGB sample and `background`.
///
/// Raw RGB only: no alpha, no perceptual weighting.
#[inline]
#[must_use]
pub fn color_distance(r: u8, g: u8, b: u8, background: Color) -> f64 {
    let dr = f64::from(r) - f64::from(background.r);
    let dg = f64::from(g) - f64::from(background.g);
    let db = f64::from(b) - f64::from(background.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Force every alpha sample of an RGBA buffer to 255.
///
/// Returns how many pixels were not already opaque.
pub fn flatten_alpha(pixels: &mut [u8]) -> usize {
    let mut flattened = 0;
    for pixel in pixels.chunks_exact_mut(4) {
        if let [_, _, _, alpha] = pixel {
            if *alpha != u8::MAX {
                *alpha = u8::MAX;
                flattened += 1;
            }
        }
    }
    flattened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_identical_is_zero() {
        let bg = Color::new(12, 200, 77);
        assert_eq!(color_distance(12, 200, 77, bg), 0.0);
    }

    #[test]
    fn test_distance_pythagorean() {
        let bg = Color::new(0, 0, 0);
        assert_eq!(color_distance(30, 40, 0, bg), 50.0);
        assert_eq!(color_distance(0, 30, 40, bg), 50.0);
    }

    #[test]
    fn test_distance_black_white() {
        let white = Color::new(255, 255, 255);
        let d = color_distance(0, 0, 0, white);
        assert!((d - 441.672_955_930_063_7).abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Color::new(10, 20, 30);
        let b = Color::new(200, 150, 100);
        assert_eq!(
            color_distance(a.r, a.g, a.b, b),
            color_distance(b.r, b.g, b.b, a)
        );
    }

    #[test]
    fn test_flatten_alpha_counts_changes() {
        let mut pixels = vec![1, 2, 3, 255, 4, 5, 6, 0, 7, 8, 9, 128];
        assert_eq!(flatten_alpha(&mut pixels), 2);
        assert_eq!(pixels, vec![1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 255]);
        assert_eq!(flatten_alpha(&mut pixels), 0);
    }
}
