//! Convert RGB pixels to 8-bit luminance
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses integer arithmetic: Y = (77*R + 150*G + 29*B + 128) >> 8

// Weights sum to 256 so pure white maps to 255 and pure black to 0
const COEF_R: u32 = 77;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Convert an interleaved RGB image to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgb_to_grayscale_into(rgb, &mut gray);
    gray
}

/// Convert RGB to grayscale into an existing buffer.
///
/// Converts `min(rgb.len() / 3, gray.len())` pixels.
pub fn rgb_to_grayscale_into(rgb: &[u8], gray: &mut [u8]) {
    for (px, out) in rgb.chunks_exact(3).zip(gray.iter_mut()) {
        *out = luma(px[0], px[1], px[2]);
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32 + 128) >> 8;
    lum.min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let gray = rgb_to_grayscale(&[255, 255, 255], 1, 1);
        assert_eq!(gray[0], 255);

        // Pure black
        let gray = rgb_to_grayscale(&[0, 0, 0], 1, 1);
        assert_eq!(gray[0], 0);

        // Pure red
        let gray = rgb_to_grayscale(&[255, 0, 0], 1, 1);
        assert!(gray[0] > 70 && gray[0] < 80);

        // Pure green dominates
        let gray = rgb_to_grayscale(&[0, 255, 0], 1, 1);
        assert!(gray[0] > 140);

        // 2x2 image
        let img = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = rgb_to_grayscale(&img, 2, 2);
        assert_eq!(gray.len(), 4);
        assert_eq!(gray[3], 255);
    }

    #[test]
    fn test_gray_input_is_preserved() {
        for v in [0u8, 1, 17, 128, 200, 254, 255] {
            let gray = rgb_to_grayscale(&[v, v, v], 1, 1);
            assert_eq!(gray[0], v);
        }
    }

    #[test]
    fn test_short_input_leaves_tail_untouched() {
        let mut gray = vec![9u8; 3];
        rgb_to_grayscale_into(&[0, 0, 0, 255, 255, 255], &mut gray);
        assert_eq!(gray, vec![0, 255, 9]);
    }
}
