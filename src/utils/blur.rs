//! Separable Gaussian smoothing on 8-bit grayscale buffers

/// How pixels outside the image are synthesised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// `aaa|abcd|ddd`
    Replicate,
    /// `cb|abcd|cb`, edge pixel not repeated
    Reflect101,
}

/// Sigma used when a kernel is requested without one
pub fn default_sigma(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Build a normalized 1-D Gaussian kernel of odd `size`.
///
/// With `sigma <= 0` the small sizes use the binomial kernels (1-2-1,
/// 1-4-6-4-1, ...) and larger sizes derive sigma from the size.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = size.max(1);
    if sigma <= 0.0 {
        match size {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            7 => {
                return vec![
                    0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
                ];
            }
            _ => {}
        }
    }

    let sigma = if sigma > 0.0 { sigma } else { default_sigma(size) };
    let center = (size as f32 - 1.0) * 0.5;
    let scale = -0.5 / (sigma * sigma);
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

#[inline]
fn border_index(i: isize, n: usize, border: Border) -> usize {
    if n == 1 {
        return 0;
    }
    let last = n as isize - 1;
    match border {
        Border::Replicate => i.clamp(0, last) as usize,
        Border::Reflect101 => {
            let mut i = i;
            while i < 0 || i > last {
                if i < 0 {
                    i = -i;
                }
                if i > last {
                    i = 2 * last - i;
                }
            }
            i as usize
        }
    }
}

/// Gaussian blur with a square `ksize` window.
///
/// Runs a horizontal pass into a float scratch buffer then a vertical pass,
/// rounding back to `u8`. Returns a new buffer; `gray` is left untouched.
pub fn gaussian_blur(
    gray: &[u8],
    width: usize,
    height: usize,
    ksize: usize,
    sigma: f32,
    border: Border,
) -> Vec<u8> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let kernel = gaussian_kernel(ksize, sigma);
    let radius = (kernel.len() / 2) as isize;

    let mut horizontal = vec![0f32; width * height];
    for y in 0..height {
        let row = &gray[y * width..(y + 1) * width];
        let out = &mut horizontal[y * width..(y + 1) * width];
        for (x, slot) in out.iter_mut().enumerate() {
            let mut acc = 0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = border_index(x as isize + k as isize - radius, width, border);
                acc += w * row[sx] as f32;
            }
            *slot = acc;
        }
    }

    let mut result = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = border_index(y as isize + k as isize - radius, height, border);
                acc += w * horizontal[sy * width + x];
            }
            result[y * width + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    result
}
