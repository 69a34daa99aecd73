pub mod bootstrap;
pub mod cutpoint;
pub mod logistic;
pub mod normal;
pub mod roc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("empty input")]
    Empty,
    #[error("length mismatch: {0} vs {1}")]
    LengthMismatch(usize, usize),
    #[error("no positive (NDI) observations")]
    NoCases,
    #[error("no negative (non-NDI) observations")]
    NoControls,
    #[error("non-finite value at index {0}")]
    NonFinite(usize),
    #[error("too few observations ({n}) for {p} parameters")]
    TooFewObservations { n: usize, p: usize },
    #[error("information matrix is singular")]
    Singular,
}

/// Sample quantile with linear interpolation between order statistics
/// (Hyndman-Fan type 7). Returns NaN for empty input.
pub fn quantile_type7(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, p)
}

pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

pub fn median(values: &[f64]) -> f64 {
    quantile_type7(values, 0.5)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with the n - 1 denominator.
pub fn sample_sd(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/mod.rs"]
mod tests;
