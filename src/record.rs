use crate::*;
use ahash::{AHashMap, AHashSet};
use clap::{ArgEnum, Parser};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::de::from_reader;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// dag costs at or above this are failures/timeouts and get stored as exactly this value
pub const DAG_COST_CAP: f64 = 1000.0;

/// where the runner writes its per-benchmark json results
pub const DEFAULT_GLOB: &str = "output/**/*.json";

/// One (benchmark, extractor) result as written by the extraction runner.
/// `json_path` and `json_dir` are provenance filled in by the loader, never read from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub name: String,
    pub extractor: String,
    pub tree: f64,
    pub dag: f64,
    pub micros: f64,
    #[serde(skip)]
    pub json_path: PathBuf,
    #[serde(skip)]
    pub json_dir: PathBuf,
}

impl BenchmarkResult {
    /// The benchmark suite this result belongs to, ie `egg` for `data/egg/math.json`
    pub fn benchset(&self) -> Option<&str> {
        self.name.split('/').nth(1).filter(|s| !s.is_empty())
    }

    /// The first cost or runtime that can't be measured against: costs must be finite, runtimes
    /// finite and non-negative
    pub fn out_of_range(&self) -> Option<(&'static str, f64)> {
        if !self.tree.is_finite() {
            Some(("tree cost", self.tree))
        } else if !self.dag.is_finite() {
            Some(("dag cost", self.dag))
        } else if !(self.micros.is_finite() && self.micros >= 0.0) {
            Some(("time", self.micros))
        } else {
            None
        }
    }

    fn with_provenance(mut self, path: &Path) -> Self {
        self.json_path = path.to_path_buf();
        self.json_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self
    }
}

/// What to do with an input file that can't be read or parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize)]
pub enum LoadPolicy {
    /// abort the whole run, reporting the file
    Strict,
    /// skip the file, logging a warning that names it
    Lenient,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        LoadPolicy::Strict
    }
}

/// Args for loading benchmark results
#[derive(Parser, Debug, Clone, Default, Serialize)]
pub struct LoadConfig {
    /// 'strict' aborts on the first unreadable result file, 'lenient' skips it with a warning
    #[clap(long, arg_enum, default_value = "strict")]
    pub policy: LoadPolicy,

    /// keep dag costs at or above 1000 as they are instead of clamping them to the failure sentinel
    #[clap(long)]
    pub no_clamp: bool,
}

/// All json files under `output/`, sorted so runs are deterministic
pub fn default_inputs() -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for entry in glob::glob(DEFAULT_GLOB)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => log::warn!("skipping unreadable path {:?}: {}", e.path(), e.error()),
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every file in `paths`. `.csv` files are runner result tables, anything else is a single json result.
pub fn load_records(paths: &[PathBuf], cfg: &LoadConfig) -> Result<Vec<BenchmarkResult>> {
    let mut records = vec![];
    for path in paths {
        match load_file(path) {
            Ok(found) => records.extend(found),
            Err(e) => match cfg.policy {
                LoadPolicy::Strict => return Err(e),
                LoadPolicy::Lenient => log::warn!("skipping {:?}: {}", path, e),
            },
        }
    }
    if !cfg.no_clamp {
        clamp_dag_costs(&mut records);
    }
    log::info!("Loaded {} results from {} files", records.len(), paths.len());
    Ok(records)
}

fn clamp_dag_costs(records: &mut [BenchmarkResult]) {
    for record in records.iter_mut() {
        if record.dag >= DAG_COST_CAP {
            record.dag = DAG_COST_CAP;
        }
    }
}

fn load_file(path: &Path) -> Result<Vec<BenchmarkResult>> {
    if path.extension().map_or(false, |ext| ext == "csv") {
        let contents = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        return parse_results_table(&contents, path);
    }
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let record: BenchmarkResult = from_reader(BufReader::new(file)).map_err(|e| AnalysisError::json(path, e))?;
    if let Some((field, value)) = record.out_of_range() {
        return Err(AnalysisError::OutOfRange {
            path: path.to_path_buf(),
            name: record.name,
            extractor: record.extractor,
            field,
            value,
        });
    }
    Ok(vec![record.with_provenance(path)])
}

/// Parse the runner's `out.csv` table: a `file, extractor, tree, dag, time (us)` header
/// followed by one row per (file, extractor).
pub fn parse_results_table(contents: &str, path: &Path) -> Result<Vec<BenchmarkResult>> {
    let mut records = vec![];
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (i == 0 && line.starts_with("file")) {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 5 {
            return Err(AnalysisError::malformed(path, i + 1, format!("expected 5 columns, found {}", fields.len())));
        }
        let number = |idx: usize, what: &str| -> Result<f64> {
            fields[idx]
                .parse::<f64>()
                .map_err(|_| AnalysisError::malformed(path, i + 1, format!("{} is not a number: {:?}", what, fields[idx])))
        };
        let record = BenchmarkResult {
            name: fields[0].to_string(),
            extractor: fields[1].to_string(),
            tree: number(2, "tree cost")?,
            dag: number(3, "dag cost")?,
            micros: number(4, "time")?,
            json_path: PathBuf::new(),
            json_dir: PathBuf::new(),
        };
        if let Some((field, value)) = record.out_of_range() {
            return Err(AnalysisError::malformed(path, i + 1, format!("{} is out of range: {}", field, value)));
        }
        records.push(record.with_provenance(path));
    }
    Ok(records)
}

/// sorted, deduplicated extractor names
pub fn extractors(records: &[BenchmarkResult]) -> Vec<String> {
    records.iter().map(|r| r.extractor.clone()).sorted().dedup().collect()
}

/// name -> result for one extractor. Two results for the same benchmark is an error.
pub fn index_by_name<'a>(records: &'a [BenchmarkResult], extractor: &str) -> Result<AHashMap<&'a str, &'a BenchmarkResult>> {
    let mut index: AHashMap<&str, &BenchmarkResult> = AHashMap::new();
    for record in records.iter().filter(|r| r.extractor == extractor) {
        if let Some(prev) = index.insert(record.name.as_str(), record) {
            return Err(AnalysisError::DuplicateRecord {
                name: record.name.clone(),
                extractor: extractor.to_string(),
                first: prev.json_path.clone(),
                second: record.json_path.clone(),
            });
        }
    }
    Ok(index)
}

/// For each extractor, the benchmark names some other extractor has a result for but it doesn't.
/// Extractors with full coverage are left out, so an empty map means every extractor saw the same benchmarks.
pub fn coverage_gaps(records: &[BenchmarkResult]) -> BTreeMap<String, Vec<String>> {
    let all_names: Vec<&str> = records.iter().map(|r| r.name.as_str()).sorted().dedup().collect();
    let mut gaps = BTreeMap::new();
    for extractor in extractors(records) {
        let seen: AHashSet<&str> = records.iter().filter(|r| r.extractor == extractor).map(|r| r.name.as_str()).collect();
        let missing: Vec<String> = all_names.iter().filter(|n| !seen.contains(*n)).map(|n| n.to_string()).collect();
        if !missing.is_empty() {
            gaps.insert(extractor, missing);
        }
    }
    gaps
}

/// Group records by the directory their file lives in, sorted by directory
pub fn group_by_dir(records: &[BenchmarkResult]) -> BTreeMap<PathBuf, Vec<BenchmarkResult>> {
    let mut groups: BTreeMap<PathBuf, Vec<BenchmarkResult>> = BTreeMap::new();
    for record in records {
        groups.entry(record.json_dir.clone()).or_default().push(record.clone());
    }
    groups
}
