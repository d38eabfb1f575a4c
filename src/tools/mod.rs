use crate::detector::QrDetector;
use crate::models::{DecodeResult, Payload, PixelBuffer};
use crate::pipeline::DecodePipeline;
use crate::utils::binarization::DARK;
use rayon::prelude::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binarized buffer.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of dark pixels.
    pub dark_pixels: usize,
    /// Total pixels in the buffer.
    pub total_pixels: usize,
    /// Ratio of dark pixels to total pixels.
    pub dark_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    if gray.is_empty() {
        return GrayStats {
            min: 0,
            max: 0,
            avg: 0,
        };
    }
    GrayStats {
        min,
        max,
        avg: (sum / gray.len() as u64) as u8,
    }
}

/// Compute dark pixel stats for a binarized (0/255) buffer.
pub fn binary_stats(binary: &[u8]) -> BinaryStats {
    let dark = binary.iter().filter(|&&v| v == DARK).count();
    let total = binary.len();
    let ratio = if total == 0 {
        0.0
    } else {
        dark as f64 / total as f64
    };
    BinaryStats {
        dark_pixels: dark,
        total_pixels: total,
        dark_ratio: ratio,
    }
}

/// True when every pixel of a luma buffer is either black or white.
pub fn is_binary(buffer: &PixelBuffer) -> bool {
    matches!(buffer, PixelBuffer::Luma(_)) && buffer.as_raw().iter().all(|&v| v == 0 || v == 255)
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("QR_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("benches/images"))
}

/// Default image limit from environment variables.
///
/// Returns `None` (full dataset) when `QR_BENCH_LIMIT` is unset or set to `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    match env::var("QR_BENCH_LIMIT") {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|v| if v == 0 { None } else { Some(v) }),
        Err(_) => None,
    }
}

/// Smoke test flag from environment variables.
pub fn smoke_from_env() -> bool {
    matches!(
        env::var("QR_SMOKE").as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") | Ok("YES")
    )
}

/// Iterate dataset image paths with optional smoke list and limit.
///
/// With `smoke` set, `_smoke.txt` under `root` lists the images to use (one
/// path per line, relative to `root`); missing or empty lists fall back to a
/// full directory walk.
pub fn dataset_iter<P: AsRef<Path>>(
    root: P,
    limit: Option<usize>,
    smoke: bool,
) -> impl Iterator<Item = PathBuf> {
    let root = root.as_ref();
    let mut images = if smoke {
        load_smoke_list(root).unwrap_or_else(|| collect_images(root))
    } else {
        collect_images(root)
    };

    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn load_smoke_list(root: &Path) -> Option<Vec<PathBuf>> {
    let contents = fs::read_to_string(root.join("_smoke.txt")).ok()?;
    let paths: Vec<PathBuf> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let candidate = Path::new(line);
            if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                root.join(candidate)
            }
        })
        .filter(|path| path.exists())
        .collect();
    if paths.is_empty() { None } else { Some(paths) }
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "bmp") {
                    images.push(path);
                }
            }
        }
    }

    images
}

/// Outcome of decoding one dataset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// A payload was recovered
    Hit(Payload),
    /// The image loaded but no stage found a code
    Miss,
    /// The file could not be read or is not an image
    LoadFailed(String),
}

/// Read and decode every file in parallel. Outcomes keep input order and a
/// file that fails to load does not affect the others.
pub fn decode_files<D, P>(pipeline: &DecodePipeline<D>, paths: &[P]) -> Vec<FileOutcome>
where
    D: QrDetector + Sync,
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let bytes = match fs::read(path.as_ref()) {
                Ok(bytes) => bytes,
                Err(err) => return FileOutcome::LoadFailed(err.to_string()),
            };
            match pipeline.decode(&bytes) {
                Ok(DecodeResult::Found(payload)) => FileOutcome::Hit(payload),
                Ok(DecodeResult::NotFound) => FileOutcome::Miss,
                Err(err) => FileOutcome::LoadFailed(err.to_string()),
            }
        })
        .collect()
}
