//! Replays recorded runtimes under a hypothetical fair-share scheduler: every benchmark of one
//! extractor starts at once and the CPU time available so far is split evenly between the ones that
//! haven't finished yet. Reading off which benchmarks have finished after each second, and how much
//! dag cost they saved relative to a reference extractor, gives an improvement-over-time curve that
//! puts fast-but-worse and slow-but-better extractors on the same axis.

use crate::*;
use ahash::AHashMap;
use serde::Serialize;

pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// dag cost per benchmark for the extractor everything else is measured against
#[derive(Debug, Clone)]
pub struct ReferenceCosts<'a> {
    pub extractor: String,
    costs: AHashMap<&'a str, f64>,
}

impl<'a> ReferenceCosts<'a> {
    pub fn new(records: &'a [BenchmarkResult], extractor: &str) -> Result<Self> {
        let costs = index_by_name(records, extractor)?
            .iter()
            .map(|(name, record)| (*name, record.dag))
            .collect();
        Ok(ReferenceCosts { extractor: extractor.to_string(), costs })
    }

    pub fn dag(&self, name: &str) -> Option<f64> {
        self.costs.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// A result together with the share of the extractor's overall dag cost improvement it accounts for.
/// Summing `improvement` over any subset of one extractor's results gives that subset's contribution
/// to the percentage improvement over the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovedRecord<'a> {
    pub record: &'a BenchmarkResult,
    pub improvement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImprovementPoint {
    pub elapsed_seconds: u64,
    /// percent improvement in dag cost from the benchmarks finished so far
    pub saving: f64,
    pub finished: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovementCurve {
    pub extractor: String,
    pub points: Vec<ImprovementPoint>,
}

/// `improvement = 100 * (ref_dag - dag) / ref_dag / n` for each of one extractor's `n` results
pub fn annotate<'a>(candidates: &[&'a BenchmarkResult], reference: &ReferenceCosts<'_>) -> Result<Vec<ImprovedRecord<'a>>> {
    let n = candidates.len() as f64;
    candidates
        .iter()
        .map(|record| {
            let ref_dag = reference.dag(&record.name).ok_or_else(|| AnalysisError::MissingBenchmark {
                name: record.name.clone(),
                extractor: reference.extractor.clone(),
                other: record.extractor.clone(),
            })?;
            if !(record.micros.is_finite() && record.micros >= 0.0) {
                return Err(AnalysisError::OutOfRange {
                    path: record.json_path.clone(),
                    name: record.name.clone(),
                    extractor: record.extractor.clone(),
                    field: "time",
                    value: record.micros,
                });
            }
            if ref_dag == 0.0 {
                return Err(AnalysisError::ZeroCost {
                    name: record.name.clone(),
                    extractor: reference.extractor.clone(),
                    field: "dag",
                });
            }
            let improvement = 100.0 * (ref_dag - record.dag) / ref_dag / n;
            Ok(ImprovedRecord { record, improvement })
        })
        .collect()
}

/// One point per elapsed second, until every benchmark has finished. Runtimes must be finite and
/// non-negative.
///
/// At second `i` the benchmarks that finished under the previous per-problem budget are charged their
/// actual runtime, and the rest of the `i` seconds of CPU time is split evenly among the ones still
/// running. Everything whose runtime is below that new budget counts as finished at `i`.
pub fn improvement_curve(candidates: &[&BenchmarkResult], reference: &ReferenceCosts<'_>) -> Result<Vec<ImprovementPoint>> {
    let mut improved = annotate(candidates, reference)?;
    improved.sort_by(|a, b| a.record.micros.total_cmp(&b.record.micros));

    let total = improved.len();
    let total_micros: f64 = improved.iter().map(|r| r.record.micros).sum();
    log::debug!(
        "simulating {} benchmarks, {} cpu seconds in total",
        total,
        (total_micros / MICROS_PER_SECOND).floor()
    );

    // sorted by runtime, so whatever has finished is always a prefix
    let finished_under = |budget: f64| improved.partition_point(|r| r.record.micros < budget);

    // once i seconds exceed the total runtime the budget is above the mean remaining runtime, so at
    // least one more benchmark finishes every step
    let horizon = (total_micros / MICROS_PER_SECOND).ceil() as u64 + total as u64 + 1;

    let mut points = vec![];
    let mut per_problem = 0.0;
    for i in 0..=horizon {
        let finished = finished_under(per_problem);
        let spent: f64 = improved[..finished].iter().map(|r| r.record.micros).sum();
        let active = total - finished;
        if active == 0 {
            break;
        }
        per_problem = (i as f64 * MICROS_PER_SECOND - spent) / active as f64;

        let finished = finished_under(per_problem);
        let saving = improved[..finished].iter().map(|r| r.improvement).sum();
        points.push(ImprovementPoint { elapsed_seconds: i, saving, finished });
    }
    Ok(points)
}

/// A curve for every extractor except `reference` and the `excluded` baselines.
/// No results at all for `reference` skips the whole thing with a warning.
pub fn improvement_curves(records: &[BenchmarkResult], reference: &str, excluded: &[String]) -> Result<Vec<ImprovementCurve>> {
    let reference_costs = ReferenceCosts::new(records, reference)?;
    if reference_costs.is_empty() {
        log::warn!("no results for reference extractor {}, skipping the time budget graph", reference);
        return Ok(vec![]);
    }

    let mut curves = vec![];
    for extractor in extractors(records) {
        if extractor == reference || excluded.contains(&extractor) {
            continue;
        }
        index_by_name(records, &extractor)?;
        let candidates: Vec<&BenchmarkResult> = records.iter().filter(|r| r.extractor == extractor).collect();
        let points = improvement_curve(&candidates, &reference_costs)?;
        log::info!("{}: {} points", extractor, points.len());
        curves.push(ImprovementCurve { extractor, points });
    }
    Ok(curves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::rec;

    fn with_reference(candidates: &[(f64, f64)], reference_dag: f64) -> Vec<BenchmarkResult> {
        let mut records = vec![];
        for (i, (dag, micros)) in candidates.iter().enumerate() {
            let name = format!("bench{}", i);
            records.push(rec(&name, "e0", *dag, *dag, *micros));
            records.push(rec(&name, "ref", reference_dag, reference_dag, 1.0));
        }
        records
    }

    fn curve_for(records: &[BenchmarkResult]) -> Vec<ImprovementPoint> {
        let reference = ReferenceCosts::new(records, "ref").unwrap();
        let candidates: Vec<&BenchmarkResult> = records.iter().filter(|r| r.extractor == "e0").collect();
        improvement_curve(&candidates, &reference).unwrap()
    }

    #[test]
    fn three_benchmarks_equal_cost() {
        let records = with_reference(&[(10., 1e6), (10., 2e6), (10., 3e6)], 10.);
        let points = curve_for(&records);
        assert!(points.len() >= 3);
        assert!(points.iter().all(|p| p.saving == 0.0));
        let finished: Vec<usize> = points.iter().map(|p| p.finished).collect();
        // 6 cpu seconds in total: the 1s benchmark is done after 3 seconds of fair sharing, the 2s one
        // after 5 and the 3s one after 6, each showing up one step later because finishing is strict
        assert_eq!(finished, vec![0, 0, 0, 0, 1, 1, 2, 3]);
        let elapsed: Vec<u64> = points.iter().map(|p| p.elapsed_seconds).collect();
        assert_eq!(elapsed, (0..8).collect::<Vec<u64>>());
    }

    #[test]
    fn finished_counts_never_decrease() {
        let records = with_reference(&[(3., 250_000.), (9., 4_100_000.), (7., 900_000.), (5., 12_345.), (2., 7_000_000.)], 8.);
        let points = curve_for(&records);
        assert!(points.windows(2).all(|w| w[0].finished <= w[1].finished));
        assert!(points.iter().all(|p| p.finished <= 5));
        assert_eq!(points.last().unwrap().finished, 5);
    }

    #[test]
    fn saving_adds_up_to_overall_improvement() {
        let records = with_reference(&[(5., 1e6), (10., 2e6), (10., 3e6)], 10.);
        let points = curve_for(&records);
        // first benchmark halves the cost, so a third of 50%
        let overall = 50.0 / 3.0;
        assert!((points.last().unwrap().saving - overall).abs() < 1e-9);
        assert!(points.iter().filter(|p| p.finished == 0).all(|p| p.saving == 0.0));
    }

    #[test]
    fn instant_benchmarks() {
        let records = with_reference(&[(5., 0.), (5., 0.)], 10.);
        let points = curve_for(&records);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], ImprovementPoint { elapsed_seconds: 0, saving: 0.0, finished: 0 });
        assert_eq!(points[1].finished, 2);
        assert!((points[1].saving - 50.0).abs() < 1e-9);
    }

    #[test]
    fn annotations_do_not_touch_records() {
        let records = with_reference(&[(5., 1.)], 10.);
        let reference = ReferenceCosts::new(&records, "ref").unwrap();
        let candidates: Vec<&BenchmarkResult> = records.iter().filter(|r| r.extractor == "e0").collect();
        let improved = annotate(&candidates, &reference).unwrap();
        assert_eq!(improved[0].improvement, 50.0);
        assert_eq!(improved[0].record, &records[0]);
    }

    #[test]
    fn missing_reference_benchmark() {
        let mut records = with_reference(&[(5., 1.)], 10.);
        records.push(rec("extra", "e0", 1., 1., 1.));
        let reference = ReferenceCosts::new(&records, "ref").unwrap();
        let candidates: Vec<&BenchmarkResult> = records.iter().filter(|r| r.extractor == "e0").collect();
        assert!(matches!(improvement_curve(&candidates, &reference), Err(AnalysisError::MissingBenchmark { .. })));
    }

    #[test]
    fn curves_skip_reference_and_baselines() {
        let mut records = with_reference(&[(5., 1e6), (10., 2e6)], 10.);
        for r in records.clone().iter().filter(|r| r.extractor == "e0") {
            let mut baseline = r.clone();
            baseline.extractor = "bottom-up".into();
            records.push(baseline);
        }
        let curves = improvement_curves(&records, "ref", &["bottom-up".to_string()]).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].extractor, "e0");
    }

    #[test]
    fn no_reference_no_curves() {
        let records = with_reference(&[(5., 1e6)], 10.);
        assert!(improvement_curves(&records, "missing", &[]).unwrap().is_empty());
    }

    #[test]
    fn unusable_runtimes_are_rejected() {
        for micros in [f64::NAN, f64::INFINITY, -1.0] {
            let records = with_reference(&[(5., 1e6), (10., micros)], 10.);
            match improvement_curves(&records, "ref", &[]) {
                Err(AnalysisError::OutOfRange { name, field, .. }) => {
                    assert_eq!(name, "bench1");
                    assert_eq!(field, "time");
                }
                other => panic!("expected an out of range time for {}, got {:?}", micros, other),
            }
        }
    }

    #[test]
    fn curve_stays_within_horizon() {
        let records = with_reference(&[(1., 999_999.), (1., 1.), (1., 4_500_000.), (1., 4_500_000.)], 1.);
        let points = curve_for(&records);
        // 10 cpu seconds over 4 benchmarks
        assert!(points.len() <= 10 + 4 + 1);
        assert_eq!(points.last().unwrap().finished, 4);
    }
}
