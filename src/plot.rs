use crate::*;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

const SIZE: (u32, u32) = (900, 540);

fn chart_error(path: &Path) -> impl FnOnce(Box<dyn std::error::Error>) -> AnalysisError + '_ {
    move |e| AnalysisError::Chart { path: path.to_path_buf(), reason: e.to_string() }
}

/// elapsed seconds vs percent dag cost improvement, one line per extractor
pub fn improvement_chart(curves: &[ImprovementCurve], path: &Path) -> Result<()> {
    draw_improvement(curves, path).map_err(chart_error(path))
}

fn draw_improvement(curves: &[ImprovementCurve], path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = curves
        .iter()
        .filter_map(|c| c.points.last())
        .map(|p| p.elapsed_seconds)
        .max()
        .unwrap_or(0)
        .max(1);
    let savings = curves.iter().flat_map(|c| c.points.iter().map(|p| p.saving));
    let (y_min, y_max) = savings.fold((0.0f64, 0.0f64), |(lo, hi), s| (lo.min(s), hi.max(s)));
    let pad = ((y_max - y_min) * 0.05).max(0.5);

    let mut chart = ChartBuilder::on(&root)
        .caption("DAG cost improvement over time", ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0u64..x_max, (y_min - pad)..(y_max + pad))?;
    chart
        .configure_mesh()
        .x_desc("Elapsed time (s)")
        .y_desc("Improvement in dag cost (%)")
        .draw()?;

    for (i, curve) in curves.iter().enumerate() {
        let color = Palette99::pick(i).mix(1.0);
        chart
            .draw_series(LineSeries::new(curve.points.iter().map(|p| (p.elapsed_seconds, p.saving)), color))?
            .label(curve.extractor.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart.configure_series_labels().border_style(BLACK).background_style(WHITE.mix(0.8)).draw()?;
    root.present()?;
    Ok(())
}

/// each extractor's runtimes sorted ascending, on a log scale
pub fn runtime_chart(series: &[(String, Vec<f64>)], path: &Path) -> Result<()> {
    draw_runtimes(series, path).map_err(chart_error(path))
}

fn draw_runtimes(series: &[(String, Vec<f64>)], path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let times = || series.iter().flat_map(|(_, ts)| ts.iter().copied());
    // zero runtimes would sit at -inf on a log axis
    let floor = times().filter(|t| *t > 0.0).fold(f64::INFINITY, f64::min).min(1e-6);
    let y_max = times().fold(floor, f64::max) * 1.5;
    let x_max = series.iter().map(|(_, ts)| ts.len()).max().unwrap_or(0).max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Extractor Time Comparison", ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0..x_max, (floor..y_max).log_scale())?;
    chart.configure_mesh().x_desc("Run").y_desc("Time (seconds)").draw()?;

    for (i, (extractor, ts)) in series.iter().enumerate() {
        let color = Palette99::pick(i).mix(1.0);
        chart
            .draw_series(LineSeries::new(ts.iter().enumerate().map(|(x, t)| (x, t.max(floor))), color))?
            .label(extractor.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart.configure_series_labels().border_style(BLACK).background_style(WHITE.mix(0.8)).draw()?;
    root.present()?;
    Ok(())
}

/// grouped bars of dag cost relative to the baseline per benchset, with a line at 1.0
pub fn benchset_chart(table: &BTreeMap<String, BTreeMap<String, f64>>, baseline: &str, path: &Path) -> Result<()> {
    draw_benchsets(table, baseline, path).map_err(chart_error(path))
}

fn draw_benchsets(table: &BTreeMap<String, BTreeMap<String, f64>>, baseline: &str, path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut extractors: Vec<&String> = table.values().flat_map(|row| row.keys()).collect();
    extractors.sort();
    extractors.dedup();

    let groups = table.len().max(1) as f64;
    let y_max = table.values().flat_map(|row| row.values().copied()).fold(1.0f64, f64::max) * 1.1;
    let label_y = -0.05 * y_max;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("DAG cost vs {} (lower is better)", baseline), ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(20)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..groups, (2.0 * label_y)..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_: &f64| String::new())
        .y_desc(format!("DAG cost vs {}", baseline))
        .draw()?;

    let width = 0.8 / extractors.len().max(1) as f64;
    for (k, extractor) in extractors.iter().enumerate() {
        let color = Palette99::pick(k).mix(1.0);
        let bars = table.values().enumerate().filter_map(|(b, row)| {
            let ratio = *row.get(*extractor)?;
            let x0 = b as f64 + 0.1 + k as f64 * width;
            Some(Rectangle::new([(x0, 0.0), (x0 + width, ratio)], color.filled()))
        });
        chart
            .draw_series(bars)?
            .label(extractor.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart.draw_series(LineSeries::new(vec![(0.0, 1.0), (groups, 1.0)], BLACK.mix(0.5)))?;
    chart.draw_series(
        table
            .keys()
            .enumerate()
            .map(|(b, benchset)| Text::new(benchset.clone(), (b as f64 + 0.4, label_y), ("sans-serif", 12).into_font())),
    )?;
    chart.configure_series_labels().border_style(BLACK).background_style(WHITE.mix(0.8)).draw()?;
    root.present()?;
    Ok(())
}
