use crate::*;
use clap::{ArgEnum, Parser};
use serde::Serialize;
use std::path::PathBuf;

pub const IMPROVEMENT_SVG: &str = "dag_cost_improvement.svg";
pub const RUNTIME_SVG: &str = "extractor_times.svg";
pub const BENCHSET_SVG: &str = "benchset_dag_cost.svg";

/// starts every cost mismatch line of a ratio summary
pub const MISMATCH_PREFIX: &str = "warning: ";

/// baselines left out of the time budget graph when none are given
pub const DEFAULT_BASELINES: [&str; 1] = ["bottom-up"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize)]
pub enum Mode {
    /// every pair of extractors over all results
    RatioSummary,
    /// every pair of extractors, separately for each directory of results
    PerDirectory,
    /// improvement over time vs the reference under a fair-share time budget
    TimeBudget,
    /// sorted runtimes per extractor
    Runtimes,
    /// result counts and dag cost vs the reference per benchset
    Benchsets,
}

/// Summarize extraction benchmark results
#[derive(Parser, Debug, Clone, Serialize)]
#[clap(name = "report")]
pub struct ReportConfig {
    /// result files, either single json results or runner csv tables. Defaults to every json under output/
    #[clap(parse(from_os_str))]
    pub files: Vec<PathBuf>,

    /// which report to produce
    #[clap(long, arg_enum, default_value = "ratio-summary")]
    pub mode: Mode,

    /// the extractor time budget improvements and benchset ratios are measured against
    #[clap(long, default_value = "faster-ilp-cbc-timeout")]
    pub reference: String,

    /// extractors that are baselines rather than candidates, left out of the time budget graph (default: bottom-up)
    #[clap(long = "baseline")]
    pub baselines: Vec<String>,

    /// only look at these extractors
    #[clap(long = "extractor")]
    pub only: Vec<String>,

    /// warn about extractors missing benchmarks that other extractors have results for
    #[clap(long)]
    pub check_coverage: bool,

    /// directory charts are written to
    #[clap(long, parse(from_os_str), default_value = ".")]
    pub out_dir: PathBuf,

    /// skip writing charts
    #[clap(long)]
    pub no_charts: bool,

    #[clap(flatten)]
    pub load: LoadConfig,

    #[clap(flatten)]
    pub ratio: RatioConfig,
}

impl ReportConfig {
    fn baselines(&self) -> Vec<String> {
        if self.baselines.is_empty() {
            DEFAULT_BASELINES.iter().map(|s| s.to_string()).collect()
        } else {
            self.baselines.clone()
        }
    }
}

/// Load the results `cfg` points at and produce its report
pub fn run(cfg: &ReportConfig) -> Result<String> {
    let paths = if cfg.files.is_empty() { default_inputs()? } else { cfg.files.clone() };
    let records = load_records(&paths, &cfg.load)?;
    report(cfg, records)
}

/// The report for already loaded results, writing charts to `cfg.out_dir` as a side effect
pub fn report(cfg: &ReportConfig, mut records: Vec<BenchmarkResult>) -> Result<String> {
    if !cfg.only.is_empty() {
        records.retain(|r| cfg.only.contains(&r.extractor));
    }
    let mut out = format!("Loaded {} results.\n", records.len());

    if cfg.check_coverage {
        for (extractor, missing) in coverage_gaps(&records) {
            log::warn!("{} has no result for {} benchmarks, first: {}", extractor, missing.len(), missing[0]);
        }
    }

    match cfg.mode {
        Mode::RatioSummary => ratio_report(&records, cfg, &mut out)?,
        Mode::PerDirectory => {
            for (dir, group) in group_by_dir(&records) {
                out.push_str(&format!("=================== {} ===================\n", dir.display()));
                if extractors(&group).len() < 2 {
                    out.push_str("only one extractor, nothing to compare\n\n");
                    continue;
                }
                ratio_report(&group, cfg, &mut out)?;
            }
        }
        Mode::TimeBudget => time_budget_report(&records, cfg, &mut out)?,
        Mode::Runtimes => runtime_report(&records, cfg, &mut out)?,
        Mode::Benchsets => benchset_report(&records, cfg, &mut out)?,
    }
    Ok(out)
}

fn ratio_report(records: &[BenchmarkResult], cfg: &ReportConfig, out: &mut String) -> Result<()> {
    for summary in summarize_all_pairs(records, &cfg.ratio)? {
        out.push_str("###################################################\n");
        out.push_str(&format!("{} vs {}\n\n", summary.e1, summary.e2));
        for mismatch in summary.mismatches.iter() {
            out.push_str(&format!("{}{}\n", MISMATCH_PREFIX, mismatch));
        }
        out.push_str(&format!("{}\n\n", summary));
    }
    Ok(())
}

fn time_budget_report(records: &[BenchmarkResult], cfg: &ReportConfig, out: &mut String) -> Result<()> {
    let curves = improvement_curves(records, &cfg.reference, &cfg.baselines())?;
    if curves.is_empty() {
        out.push_str(&format!("no time budget graph: nothing to compare against {}\n", cfg.reference));
        return Ok(());
    }
    out.push_str(&format!("dag cost improvement over {}\n", cfg.reference));
    for curve in curves.iter() {
        if let Some(last) = curve.points.last() {
            out.push_str(&format!(
                "{}: {:.2}% after {}s ({} finished)\n",
                curve.extractor, last.saving, last.elapsed_seconds, last.finished
            ));
        }
    }
    if !cfg.no_charts {
        let path = cfg.out_dir.join(IMPROVEMENT_SVG);
        improvement_chart(&curves, &path)?;
        out.push_str(&format!("Wrote {}\n", path.display()));
    }
    Ok(())
}

fn runtime_report(records: &[BenchmarkResult], cfg: &ReportConfig, out: &mut String) -> Result<()> {
    let series = runtime_series(records, &extractors(records));
    for (extractor, times) in series.iter() {
        out.push_str(&format!(
            "{}: {} runs, mean={:.4}s, std={:.4}s, median={:.4}s, max={:.4}s\n",
            extractor,
            times.len(),
            mean(times)?,
            std_dev(times)?,
            FiveNumberSummary::of(times, cfg.ratio.quantile_method)?.median,
            times.last().copied().unwrap_or_default(),
        ));
    }
    if !cfg.no_charts {
        let path = cfg.out_dir.join(RUNTIME_SVG);
        runtime_chart(&series, &path)?;
        out.push_str(&format!("Wrote {}\n", path.display()));
    }
    Ok(())
}

fn benchset_report(records: &[BenchmarkResult], cfg: &ReportConfig, out: &mut String) -> Result<()> {
    out.push_str("results per benchset\n");
    out.push_str(&format!("{}\n", format_table(&count_table(records))));

    let candidates: Vec<String> = extractors(records).into_iter().filter(|e| *e != cfg.reference).collect();
    let ratios = dag_ratio_table(records, &cfg.reference, &candidates);
    if ratios.is_empty() {
        log::warn!("no results for reference extractor {}, skipping dag cost ratios", cfg.reference);
        return Ok(());
    }
    out.push_str(&format!("dag cost vs {} (lower is better)\n", cfg.reference));
    out.push_str(&format!("{}\n", format_table(&ratios)));
    if !cfg.no_charts {
        let path = cfg.out_dir.join(BENCHSET_SVG);
        benchset_chart(&ratios, &cfg.reference, &path)?;
        out.push_str(&format!("Wrote {}\n", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::rec;

    fn cfg(args: &str) -> ReportConfig {
        ReportConfig::parse_from(format!("report --no-charts {}", args).split_whitespace())
    }

    fn records() -> Vec<BenchmarkResult> {
        vec![
            rec("data/egg/a.json", "bottom-up", 10., 10., 100.),
            rec("data/egg/a.json", "faster-ilp-cbc-timeout", 10., 8., 3_000_000.),
            rec("data/egg/a.json", "greedy-dag", 10., 9., 1_000.),
            rec("data/egg/b.json", "bottom-up", 4., 4., 50.),
            rec("data/egg/b.json", "faster-ilp-cbc-timeout", 4., 4., 2_000_000.),
            rec("data/egg/b.json", "greedy-dag", 4., 4., 900.),
        ]
    }

    fn headers(out: &str) -> usize {
        out.lines().filter(|l| l.starts_with("####")).count()
    }

    #[test]
    fn defaults() {
        let c = cfg("");
        assert_eq!(c.mode, Mode::RatioSummary);
        assert_eq!(c.reference, "faster-ilp-cbc-timeout");
        assert_eq!(c.baselines(), vec!["bottom-up".to_string()]);
        assert_eq!(c.load.policy, LoadPolicy::Strict);
        assert!(c.files.is_empty());
    }

    #[test]
    fn ratio_summary_covers_all_pairs() {
        let out = report(&cfg(""), records()).unwrap();
        assert_eq!(headers(&out), 6);
        assert!(out.contains("greedy-dag vs bottom-up"));
        assert!(out.contains("warning: data/egg/a.json differs in dag cost: 9 10\n"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn extractor_filter() {
        let out = report(&cfg("--extractor greedy-dag --extractor bottom-up"), records()).unwrap();
        assert_eq!(headers(&out), 2);
        assert!(!out.contains("faster-ilp-cbc-timeout"));
    }

    #[test]
    fn per_directory() {
        let out = report(&cfg("--mode per-directory"), records()).unwrap();
        // every extractor's results live in their own directory here
        assert_eq!(out.matches("only one extractor").count(), 3);
    }

    #[test]
    fn time_budget() {
        let out = report(&cfg("--mode time-budget"), records()).unwrap();
        assert!(out.contains("greedy-dag: -6.25% after"));
        assert!(!out.contains("bottom-up:"));
    }

    #[test]
    fn time_budget_without_reference() {
        let out = report(&cfg("--mode time-budget --reference nobody"), records()).unwrap();
        assert!(out.contains("no time budget graph"));
    }

    #[test]
    fn runtimes() {
        let out = report(&cfg("--mode runtimes"), records()).unwrap();
        assert!(out.contains("faster-ilp-cbc-timeout: 2 runs, mean=2.5000s"));
    }

    #[test]
    fn benchsets() {
        let out = report(&cfg("--mode benchsets"), records()).unwrap();
        assert!(out.contains("results per benchset"));
        assert!(out.contains("dag cost vs faster-ilp-cbc-timeout"));
    }
}
