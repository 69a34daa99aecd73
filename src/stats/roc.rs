use std::cmp::Ordering;

use serde::Serialize;

use crate::stats::{StatsError, median};

/// Which side of the score scale marks the NDI cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Auto,
    HigherIsRisk,
    LowerIsRisk,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::Auto => "auto",
            Direction::HigherIsRisk => "higher_is_risk",
            Direction::LowerIsRisk => "lower_is_risk",
        }
    }

    /// `Auto` becomes `HigherIsRisk` when the control median does not exceed
    /// the case median.
    pub fn resolve(self, scores: &[f64], labels: &[bool]) -> Direction {
        match self {
            Direction::Auto => {
                let (cases, controls) = split_by_label(scores, labels);
                if median(&controls) <= median(&cases) {
                    Direction::HigherIsRisk
                } else {
                    Direction::LowerIsRisk
                }
            }
            other => other,
        }
    }

    /// Maps a score onto the scale where larger means more at risk. The map
    /// is its own inverse.
    pub fn orient(self, value: f64) -> f64 {
        match self {
            Direction::LowerIsRisk => -value,
            _ => value,
        }
    }
}

pub fn split_by_label(scores: &[f64], labels: &[bool]) -> (Vec<f64>, Vec<f64>) {
    let mut cases = Vec::new();
    let mut controls = Vec::new();
    for (&s, &l) in scores.iter().zip(labels) {
        if l {
            cases.push(s);
        } else {
            controls.push(s);
        }
    }
    (cases, controls)
}

/// Operating point. `threshold` is in original score units; a participant is
/// test-positive when its oriented score is at or beyond the oriented threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
    pub tp: usize,
    pub fp: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RocCurve {
    pub direction: Direction,
    pub points: Vec<RocPoint>,
    pub auc: f64,
    pub n_cases: usize,
    pub n_controls: usize,
}

pub fn validate_inputs(scores: &[f64], labels: &[bool]) -> Result<(usize, usize), StatsError> {
    if scores.is_empty() {
        return Err(StatsError::Empty);
    }
    if scores.len() != labels.len() {
        return Err(StatsError::LengthMismatch(scores.len(), labels.len()));
    }
    if let Some(idx) = scores.iter().position(|s| !s.is_finite()) {
        return Err(StatsError::NonFinite(idx));
    }
    let n_cases = labels.iter().filter(|&&l| l).count();
    let n_controls = labels.len() - n_cases;
    if n_cases == 0 {
        return Err(StatsError::NoCases);
    }
    if n_controls == 0 {
        return Err(StatsError::NoControls);
    }
    Ok((n_cases, n_controls))
}

/// Empirical ROC curve from the highest oriented score downwards. Tied scores
/// move together, so the curve has one point per distinct score plus the
/// origin. Thresholds sit halfway between consecutive distinct scores.
pub fn roc_curve(
    scores: &[f64],
    labels: &[bool],
    direction: Direction,
) -> Result<RocCurve, StatsError> {
    let (n_cases, n_controls) = validate_inputs(scores, labels)?;
    let direction = direction.resolve(scores, labels);

    let oriented: Vec<f64> = scores.iter().map(|&s| direction.orient(s)).collect();
    let mut order: Vec<usize> = (0..oriented.len()).collect();
    order.sort_by(|&a, &b| {
        oriented[b]
            .partial_cmp(&oriented[a])
            .unwrap_or(Ordering::Equal)
    });

    let p = n_cases as f64;
    let n = n_controls as f64;
    let mut points = Vec::new();
    points.push(RocPoint {
        threshold: direction.orient(f64::INFINITY),
        fpr: 0.0,
        tpr: 0.0,
        tp: 0,
        fp: 0,
    });

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0usize;
    while i < order.len() {
        let current = oriented[order[i]];
        while i < order.len() && oriented[order[i]] == current {
            if labels[order[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        let cut = if i < order.len() {
            (current + oriented[order[i]]) / 2.0
        } else {
            f64::NEG_INFINITY
        };
        points.push(RocPoint {
            threshold: direction.orient(cut),
            fpr: fp as f64 / n,
            tpr: tp as f64 / p,
            tp,
            fp,
        });
    }

    let auc = points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum();

    Ok(RocCurve {
        direction,
        points,
        auc,
        n_cases,
        n_controls,
    })
}

/// Mann-Whitney AUC over already-oriented values, ties counted as one half.
/// `controls_sorted` must be ascending.
pub fn auc_from_sorted_controls(cases: &[f64], controls_sorted: &[f64]) -> f64 {
    if cases.is_empty() || controls_sorted.is_empty() {
        return f64::NAN;
    }
    let mut wins = 0.0f64;
    for &x in cases {
        let below = controls_sorted.partition_point(|&c| c < x);
        let at_or_below = controls_sorted.partition_point(|&c| c <= x);
        wins += below as f64 + 0.5 * (at_or_below - below) as f64;
    }
    wins / (cases.len() as f64 * controls_sorted.len() as f64)
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/roc.rs"]
mod tests;
