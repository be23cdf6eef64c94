use crate::*;
use std::collections::BTreeMap;

/// Results that have no benchset in their name are grouped under this
pub const NO_BENCHSET: &str = "(none)";

fn benchset_of(record: &BenchmarkResult) -> &str {
    record.benchset().unwrap_or(NO_BENCHSET)
}

/// Per extractor, its runtimes in seconds sorted ascending. Extractors keep the order they're given in.
pub fn runtime_series(records: &[BenchmarkResult], extractors: &[String]) -> Vec<(String, Vec<f64>)> {
    extractors
        .iter()
        .map(|extractor| {
            let mut times: Vec<f64> = records
                .iter()
                .filter(|r| &r.extractor == extractor)
                .map(|r| r.micros / MICROS_PER_SECOND)
                .collect();
            times.sort_by(f64::total_cmp);
            (extractor.clone(), times)
        })
        .collect()
}

/// benchset -> extractor -> number of results
pub fn count_table(records: &[BenchmarkResult]) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut table: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for record in records {
        *table
            .entry(benchset_of(record).to_string())
            .or_default()
            .entry(record.extractor.clone())
            .or_insert(0) += 1;
    }
    table
}

fn dag_sums(records: &[BenchmarkResult]) -> BTreeMap<(String, String), f64> {
    let mut sums = BTreeMap::new();
    for record in records {
        *sums.entry((benchset_of(record).to_string(), record.extractor.clone())).or_insert(0.0) += record.dag;
    }
    sums
}

/// benchset -> extractor -> (summed dag cost of extractor) / (summed dag cost of baseline).
/// Lower is better. Benchsets where the baseline has no results (or sums to zero) are left out.
pub fn dag_ratio_table(records: &[BenchmarkResult], baseline: &str, extractors: &[String]) -> BTreeMap<String, BTreeMap<String, f64>> {
    let sums = dag_sums(records);
    let mut table: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for ((benchset, extractor), sum) in sums.iter() {
        if !extractors.contains(extractor) {
            continue;
        }
        let base = match sums.get(&(benchset.clone(), baseline.to_string())) {
            Some(base) if *base != 0.0 => *base,
            _ => continue,
        };
        table.entry(benchset.clone()).or_default().insert(extractor.clone(), sum / base);
    }
    table
}

/// Render a benchset x extractor table with one column per extractor, missing cells blank
pub fn format_table<T: std::fmt::Display>(table: &BTreeMap<String, BTreeMap<String, T>>) -> String {
    let mut columns: Vec<&String> = table.values().flat_map(|row| row.keys()).collect();
    columns.sort();
    columns.dedup();
    let first_width = table.keys().map(|k| k.len()).chain(std::iter::once("benchset".len())).max().unwrap_or(0);
    let widths: Vec<usize> = columns.iter().map(|c| c.len().max(8)).collect();

    let mut out = format!("{:<w$}", "benchset", w = first_width);
    for (column, width) in columns.iter().zip(widths.iter()) {
        out += &format!("  {:>w$}", column, w = *width);
    }
    out.push('\n');
    for (benchset, row) in table.iter() {
        out += &format!("{:<w$}", benchset, w = first_width);
        for (column, width) in columns.iter().zip(widths.iter()) {
            let cell = row.get(*column).map(|v| format!("{:.4}", v)).unwrap_or_default();
            out += &format!("  {:>w$}", cell, w = *width);
        }
        out.push('\n');
    }
    out
}
