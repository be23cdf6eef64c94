use crate::*;
use clap::{ArgEnum, Parser};
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Whether two extractors are expected to agree on tree cost. Tree extraction is a solved problem
/// so a correct extractor should match any other on it, but some extractors only optimize dag cost
/// and pick a worse tree along the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize)]
pub enum TreeCostPolicy {
    /// tree cost differences get reported next to dag cost differences
    MustMatch,
    /// tree cost differences are expected and not reported
    MayDiffer,
}

impl Default for TreeCostPolicy {
    fn default() -> Self {
        TreeCostPolicy::MustMatch
    }
}

/// Args for comparing two extractors
#[derive(Parser, Debug, Clone, Default, Serialize)]
pub struct RatioConfig {
    /// 'must-match' reports benchmarks where two extractors disagree on tree cost, 'may-differ' doesn't
    #[clap(long, arg_enum, default_value = "must-match")]
    pub tree_costs: TreeCostPolicy,

    /// how quartiles are interpolated
    #[clap(long, arg_enum, default_value = "exclusive")]
    pub quantile_method: QuantileMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostKind {
    Tree,
    Dag,
}

impl Display for CostKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CostKind::Tree => write!(f, "tree"),
            CostKind::Dag => write!(f, "dag"),
        }
    }
}

/// A benchmark where the two extractors found different costs. Not an error, just worth a look.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostMismatch {
    pub name: String,
    pub kind: CostKind,
    pub first: f64,
    pub second: f64,
}

impl Display for CostMismatch {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} differs in {} cost: {} {}", self.name, self.kind, self.first, self.second)
    }
}

/// e1 / e2 for one benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRatios {
    pub name: String,
    pub tree: f64,
    pub dag: f64,
    pub micros: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatioSummary {
    pub e1: String,
    pub e2: String,
    pub ratios: Vec<BenchmarkRatios>,
    pub mismatches: Vec<CostMismatch>,
    pub e1_micros: f64,
    pub e2_micros: f64,
    pub geo_mean_tree: f64,
    pub geo_mean_dag: f64,
    pub geo_mean_micros: f64,
    pub tree: FiveNumberSummary,
    pub dag: FiveNumberSummary,
    pub micros: FiveNumberSummary,
}

/// `num / denom`, where both costs must be positive for the geometric mean to make sense
fn ratio(name: &str, field: &'static str, (e1, num): (&str, f64), (e2, denom): (&str, f64)) -> Result<f64> {
    for (extractor, cost) in [(e2, denom), (e1, num)] {
        if !(cost > 0.0) {
            return Err(AnalysisError::ZeroCost { name: name.to_string(), extractor: extractor.to_string(), field });
        }
    }
    Ok(num / denom)
}

/// Compare `e1` against `e2` on every benchmark either of them ran. A benchmark that only one of
/// them has a result for is an error naming the extractor that lacks it.
pub fn summarize(records: &[BenchmarkResult], e1: &str, e2: &str, cfg: &RatioConfig) -> Result<RatioSummary> {
    let by_e1 = index_by_name(records, e1)?;
    let by_e2 = index_by_name(records, e2)?;

    let names: Vec<&str> = by_e1.keys().chain(by_e2.keys()).copied().sorted().dedup().collect();

    let mut ratios = Vec::with_capacity(names.len());
    let mut mismatches = vec![];
    let mut e1_micros = 0.0;
    let mut e2_micros = 0.0;

    for name in names {
        let missing = |extractor: &str, other: &str| AnalysisError::MissingBenchmark {
            name: name.to_string(),
            extractor: extractor.to_string(),
            other: other.to_string(),
        };
        let r1 = by_e1.get(name).ok_or_else(|| missing(e1, e2))?;
        let r2 = by_e2.get(name).ok_or_else(|| missing(e2, e1))?;

        if cfg.tree_costs == TreeCostPolicy::MustMatch && r1.tree != r2.tree {
            mismatches.push(CostMismatch { name: name.to_string(), kind: CostKind::Tree, first: r1.tree, second: r2.tree });
        }
        if r1.dag != r2.dag {
            mismatches.push(CostMismatch { name: name.to_string(), kind: CostKind::Dag, first: r1.dag, second: r2.dag });
        }

        ratios.push(BenchmarkRatios {
            name: name.to_string(),
            tree: ratio(name, "tree", (e1, r1.tree), (e2, r2.tree))?,
            dag: ratio(name, "dag", (e1, r1.dag), (e2, r2.dag))?,
            // max(1, _) so sub-microsecond runs don't divide by zero
            micros: r1.micros.max(1.0) / r2.micros.max(1.0),
        });

        e1_micros += r1.micros;
        e2_micros += r2.micros;
    }

    if ratios.is_empty() {
        return Err(AnalysisError::NoData(format!("no benchmarks for {} or {}", e1, e2)));
    }

    let column = |f: fn(&BenchmarkRatios) -> f64| ratios.iter().map(f).collect::<Vec<f64>>();
    let tree = column(|r| r.tree);
    let dag = column(|r| r.dag);
    let micros = column(|r| r.micros);

    log::debug!("compared {} benchmarks of {} vs {}", ratios.len(), e1, e2);

    Ok(RatioSummary {
        e1: e1.to_string(),
        e2: e2.to_string(),
        geo_mean_tree: geometric_mean(&tree)?,
        geo_mean_dag: geometric_mean(&dag)?,
        geo_mean_micros: geometric_mean(&micros)?,
        tree: FiveNumberSummary::of(&tree, cfg.quantile_method)?,
        dag: FiveNumberSummary::of(&dag, cfg.quantile_method)?,
        micros: FiveNumberSummary::of(&micros, cfg.quantile_method)?,
        ratios,
        mismatches,
        e1_micros,
        e2_micros,
    })
}

/// `summarize` for every ordered pair of distinct extractors, in sorted order
pub fn summarize_all_pairs(records: &[BenchmarkResult], cfg: &RatioConfig) -> Result<Vec<RatioSummary>> {
    let extractors = extractors(records);
    let mut summaries = vec![];
    for e1 in extractors.iter() {
        for e2 in extractors.iter().filter(|e2| *e2 != e1) {
            summaries.push(summarize(records, e1, e2, cfg)?);
        }
    }
    Ok(summaries)
}

impl Display for RatioSummary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "cumulative time for {}: {:.0}ms", self.e1, self.e1_micros / 1000.0)?;
        writeln!(f, "cumulative time for {}: {:.0}ms", self.e2, self.e2_micros / 1000.0)?;
        writeln!(f)?;
        writeln!(f, "{} / {}", self.e1, self.e2)?;
        writeln!(f, "geo mean")?;
        writeln!(f, "tree: {:.4}", self.geo_mean_tree)?;
        writeln!(f, "dag: {:.4}", self.geo_mean_dag)?;
        writeln!(f, "micros: {:.4}", self.geo_mean_micros)?;
        writeln!(f, "quantiles")?;
        writeln!(f, "tree:   {}", self.tree)?;
        writeln!(f, "dag:    {}", self.dag)?;
        write!(f, "micros: {}", self.micros)
    }
}
