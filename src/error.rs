use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Everything that can go wrong while loading, converting or summarizing benchmark results.
/// Each variant carries enough context (path, benchmark, extractor) to act on the message alone.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse json in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path:?} line {line}: {reason}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("duplicate result for benchmark {name} under extractor {extractor}: {first:?} and {second:?}")]
    DuplicateRecord {
        name: String,
        extractor: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("benchmark {name} has a result for {other} but none for {extractor}")]
    MissingBenchmark {
        name: String,
        extractor: String,
        other: String,
    },

    #[error("benchmark {name} has a non-positive {field} cost under {extractor}, cannot take a ratio")]
    ZeroCost {
        name: String,
        extractor: String,
        field: &'static str,
    },

    #[error("{path:?}: benchmark {name} under {extractor} has an out of range {field}: {value}")]
    OutOfRange {
        path: PathBuf,
        name: String,
        extractor: String,
        field: &'static str,
        value: f64,
    },

    #[error("no data: {0}")]
    NoData(String),

    #[error("geometric mean needs positive values, got {0}")]
    NonPositive(f64),

    #[error("bad glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("could not render chart {path:?}: {reason}")]
    Chart { path: PathBuf, reason: String },
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        AnalysisError::Json { path: path.into(), source }
    }

    pub fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        AnalysisError::MalformedLine { path: path.into(), line, reason: reason.into() }
    }
}
