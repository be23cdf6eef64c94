use crate::BenchmarkResult;
use std::path::PathBuf;

/// a result as if it had been loaded from `output/<extractor>/<name>.json`
pub fn rec(name: &str, extractor: &str, tree: f64, dag: f64, micros: f64) -> BenchmarkResult {
    BenchmarkResult {
        name: name.into(),
        extractor: extractor.into(),
        tree,
        dag,
        micros,
        json_path: PathBuf::from(format!("output/{}/{}.json", extractor, name.replace('/', "_"))),
        json_dir: PathBuf::from(format!("output/{}", extractor)),
    }
}

/// write `contents` to `dir/relative`, creating parent directories
pub fn write_fixture(dir: &std::path::Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

/// a fresh scratch directory under the system temp dir, unique per test name and process
pub fn scratch_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gym_stats_{}_{}", test_name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
