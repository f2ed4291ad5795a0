//! Background color estimation from corner samples

use super::CORNER_SAMPLE_SIZE;
use crate::types::{Color, Dimensions};

/// Average the RGB of a square sample taken from each of the four corners.
///
/// Right and bottom corners are addressed by mirroring (`width - 1 - x`,
/// `height - 1 - y`), so on a 10x10 image all four windows cover the whole
/// image. The sample window shrinks to fit images smaller than
/// [`CORNER_SAMPLE_SIZE`]; the pipeline rejects those before getting here.
#[must_use]
pub fn estimate_background_color(pixels: &[u8], dimensions: Dimensions) -> Color {
    let Dimensions { width, height } = dimensions;
    let sample_w = CORNER_SAMPLE_SIZE.min(width);
    let sample_h = CORNER_SAMPLE_SIZE.min(height);

    let mut sums = [0u64; 3];
    let mut count = 0u64;

    for y in 0..sample_h {
        for x in 0..sample_w {
            let corners = [
                (x, y),
                (width - 1 - x, y),
                (x, height - 1 - y),
                (width - 1 - x, height - 1 - y),
            ];
            for (cx, cy) in corners {
                let offset = dimensions.offset(cx, cy);
                if let Some(&[r, g, b, _]) = pixels.get(offset..offset + 4) {
                    sums[0] += u64::from(r);
                    sums[1] += u64::from(g);
                    sums[2] += u64::from(b);
                    count += 1;
                }
            }
        }
    }

    if count == 0 {
        return Color::default();
    }

    let mean = |sum: u64| (sum as f64 / count as f64).round() as u8;
    Color::new(mean(sums[0]), mean(sums[1]), mean(sums[2]))
}
