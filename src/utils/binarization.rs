//! Binarization of 8-bit grayscale buffers.
//!
//! Output buffers use 0 for dark and 255 for light pixels so they can be fed
//! straight back to a detector as ordinary grayscale images.

use super::blur::{Border, gaussian_blur};

/// Value written for pixels classified as light
pub const LIGHT: u8 = 255;
/// Value written for pixels classified as dark
pub const DARK: u8 = 0;

/// Binarize with Otsu's method, returning the buffer and the chosen threshold.
/// Pixels strictly above the threshold become [`LIGHT`].
pub fn otsu_binarize(gray: &[u8]) -> (Vec<u8>, u8) {
    let threshold = calculate_otsu_threshold(gray);
    (threshold_binarize(gray, threshold), threshold)
}

/// Calculate Otsu's optimal threshold.
///
/// Returns the intensity `t` that maximizes the between-class variance of the
/// classes `<= t` and `> t`. Single-valued and empty inputs yield 0.
pub fn calculate_otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }
    if gray.is_empty() {
        return 0;
    }

    let total = gray.len() as f64;
    let mean: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>()
        / total;

    let eps = f64::EPSILON;
    let mut q1 = 0.0f64;
    let mut mu1 = 0.0f64;
    let mut max_sigma = 0.0f64;
    let mut optimal = 0u8;

    for (i, &count) in histogram.iter().enumerate() {
        let p_i = count as f64 / total;
        mu1 *= q1;
        q1 += p_i;
        let q2 = 1.0 - q1;

        if q1.min(q2) < eps || q1.max(q2) > 1.0 - eps {
            continue;
        }

        mu1 = (mu1 + i as f64 * p_i) / q1;
        let mu2 = (mean - q1 * mu1) / q2;
        let sigma = q1 * q2 * (mu1 - mu2) * (mu1 - mu2);
        if sigma > max_sigma {
            max_sigma = sigma;
            optimal = i as u8;
        }
    }

    optimal
}

/// Global threshold: pixels above `threshold` become [`LIGHT`]
pub fn threshold_binarize(gray: &[u8], threshold: u8) -> Vec<u8> {
    gray.iter()
        .map(|&v| if v > threshold { LIGHT } else { DARK })
        .collect()
}

/// Locally adaptive threshold against a Gaussian-weighted neighbourhood mean.
///
/// A pixel is [`LIGHT`] when it is greater than `mean - offset`, where `mean`
/// is the `block_size` x `block_size` Gaussian average around it (replicated
/// border). `block_size` should be odd.
pub fn adaptive_gaussian_binarize(
    gray: &[u8],
    width: usize,
    height: usize,
    block_size: usize,
    offset: i32,
) -> Vec<u8> {
    let mean = gaussian_blur(gray, width, height, block_size, 0.0, Border::Replicate);
    gray.iter()
        .zip(mean.iter())
        .map(|(&v, &m)| {
            if v as i32 > (m as i32).saturating_sub(offset) {
                LIGHT
            } else {
                DARK
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarize() {
        let gray = vec![100, 150, 200, 50];
        let binary = threshold_binarize(&gray, 128);
        assert_eq!(binary, vec![DARK, LIGHT, LIGHT, DARK]);
    }

    #[test]
    fn test_otsu_binarize() {
        // Create a simple two-class image
        let mut gray = vec![50u8; 50];
        gray.extend(vec![200u8; 50]);

        let (binary, threshold) = otsu_binarize(&gray);

        assert!((50..200).contains(&threshold));
        assert_eq!(binary[0], DARK);
        assert_eq!(binary[70], LIGHT);
    }

    #[test]
    fn test_otsu_uniform_and_empty() {
        assert_eq!(calculate_otsu_threshold(&[]), 0);
        assert_eq!(calculate_otsu_threshold(&[90; 64]), 0);
    }

    #[test]
    fn test_otsu_ignores_noise_within_classes() {
        let mut gray = Vec::new();
        for i in 0..200u32 {
            gray.push(30 + (i % 20) as u8);
            gray.push(190 + (i % 30) as u8);
        }
        let threshold = calculate_otsu_threshold(&gray);
        assert!(threshold >= 49 && threshold < 190, "threshold {threshold}");
    }

    #[test]
    fn test_adaptive_output_is_binary() {
        let gray: Vec<u8> = (0..20 * 20).map(|i| ((i * 37) % 256) as u8).collect();
        let binary = adaptive_gaussian_binarize(&gray, 20, 20, 11, 2);
        assert_eq!(binary.len(), gray.len());
        assert!(binary.iter().all(|&v| v == DARK || v == LIGHT));
    }

    #[test]
    fn test_adaptive_handles_gradient_background() {
        // Dark vertical bar on a left-to-right brightness ramp
        let (w, h) = (40usize, 20usize);
        let mut gray = vec![0u8; w * h];
        for y in 0..h {
            for x in 0..w {
                let background = 60 + (x * 180 / w) as u8;
                gray[y * w + x] = if (18..22).contains(&x) {
                    background.saturating_sub(50)
                } else {
                    background
                };
            }
        }
        let binary = adaptive_gaussian_binarize(&gray, w, h, 11, 2);
        for y in 0..h {
            assert_eq!(binary[y * w + 19], DARK);
            assert_eq!(binary[y * w + 5], LIGHT);
            assert_eq!(binary[y * w + 35], LIGHT);
        }
    }

    #[test]
    fn test_adaptive_extreme_offsets_saturate() {
        let gray: Vec<u8> = (0..12 * 12).map(|i| ((i * 53) % 256) as u8).collect();
        // Threshold pinned above any pixel value
        let dark = adaptive_gaussian_binarize(&gray, 12, 12, 5, i32::MIN);
        assert!(dark.iter().all(|&v| v == DARK));
        // Threshold pinned below any pixel value
        let light = adaptive_gaussian_binarize(&gray, 12, 12, 5, i32::MAX);
        assert!(light.iter().all(|&v| v == LIGHT));
    }

    #[test]
    fn test_adaptive_flat_region_is_light() {
        let gray = vec![10u8; 15 * 15];
        let binary = adaptive_gaussian_binarize(&gray, 15, 15, 11, 2);
        assert!(binary.iter().all(|&v| v == LIGHT));
    }
}
