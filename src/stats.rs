use crate::*;
use clap::ArgEnum;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// How cut points are interpolated between data points
#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize)]
pub enum QuantileMethod {
    /// treats the data as a sample from a larger population, so cut points can land outside [min, max]
    Exclusive,
    /// treats the data as the whole population, min and max are the 0th and 100th percentile
    Inclusive,
}

impl Default for QuantileMethod {
    fn default() -> Self {
        QuantileMethod::Exclusive
    }
}

pub fn geometric_mean(xs: &[f64]) -> Result<f64> {
    if xs.is_empty() {
        return Err(AnalysisError::NoData("geometric mean of an empty list".into()));
    }
    if let Some(bad) = xs.iter().find(|x| !(x.is_finite() && **x > 0.0)) {
        return Err(AnalysisError::NonPositive(*bad));
    }
    let log_mean = xs.iter().map(|x| x.ln()).sum::<f64>() / xs.len() as f64;
    Ok(log_mean.exp())
}

pub fn mean(xs: &[f64]) -> Result<f64> {
    if xs.is_empty() {
        return Err(AnalysisError::NoData("mean of an empty list".into()));
    }
    Ok(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// population standard deviation
pub fn std_dev(xs: &[f64]) -> Result<f64> {
    let m = mean(xs)?;
    let variance = xs.iter().map(|x| f64::powi(x - m, 2)).sum::<f64>() / xs.len() as f64;
    Ok(variance.sqrt())
}

/// The `n - 1` cut points that split `xs` into `n` equal-probability groups (`n = 4` gives quartiles).
/// A single data point is its own every quantile.
pub fn quantiles(xs: &[f64], n: usize, method: QuantileMethod) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(AnalysisError::NoData("quantiles into zero groups".into()));
    }
    let mut data = xs.to_vec();
    data.sort_by(f64::total_cmp);
    let ld = data.len();
    match ld {
        0 => return Err(AnalysisError::NoData("quantiles of an empty list".into())),
        1 => return Ok(vec![data[0]; n - 1]),
        _ => {}
    }
    let cuts = (1..n)
        .map(|i| match method {
            QuantileMethod::Exclusive => {
                let m = ld + 1;
                let j = (i * m / n).clamp(1, ld - 1);
                let delta = (i * m) as f64 - (j * n) as f64;
                (data[j - 1] * (n as f64 - delta) + data[j] * delta) / n as f64
            }
            QuantileMethod::Inclusive => {
                let m = ld - 1;
                let j = i * m / n;
                let delta = (i * m - j * n) as f64;
                (data[j] * (n as f64 - delta) + data[j + 1] * delta) / n as f64
            }
        })
        .collect();
    Ok(cuts)
}

/// min, the three quartiles, max
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    pub fn of(xs: &[f64], method: QuantileMethod) -> Result<Self> {
        let qs = quantiles(xs, 4, method)?;
        let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(FiveNumberSummary { min, q1: qs[0], median: qs[1], q3: qs[2], max })
    }
}

impl Display for FiveNumberSummary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:.4}, {:.4}, {:.4}, {:.4}, {:.4}", self.min, self.q1, self.median, self.q3, self.max)
    }
}
