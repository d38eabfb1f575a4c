use rust_qr_reader::tools::{bench_limit_from_env, dataset_iter, dataset_root_from_env, smoke_from_env};
use std::path::PathBuf;

/// Encoded bytes of the dataset images selected by the environment
pub fn collect_dataset_images() -> (PathBuf, Vec<(PathBuf, Vec<u8>)>) {
    let root = dataset_root_from_env();
    let limit = bench_limit_from_env();
    let smoke = smoke_from_env();

    let images = dataset_iter(&root, limit, smoke)
        .filter_map(|path| std::fs::read(&path).ok().map(|bytes| (path, bytes)))
        .collect();
    (root, images)
}
