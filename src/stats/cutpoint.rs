use serde::Serialize;

use crate::stats::roc::{Direction, RocCurve};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cutpoint {
    pub threshold: f64,
    pub direction: Direction,
    pub sensitivity: f64,
    pub specificity: f64,
    pub youden_j: f64,
    pub ppv: Option<f64>,
    pub npv: Option<f64>,
    pub accuracy: f64,
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl Cutpoint {
    /// Human-readable positivity rule, e.g. `score >= 0.42`.
    pub fn rule(&self) -> String {
        match self.direction {
            Direction::LowerIsRisk => format!("score <= {:.3}", self.threshold),
            _ => format!("score >= {:.3}", self.threshold),
        }
    }
}

/// Youden-optimal operating point over the finite thresholds of `curve`.
/// Ties keep the first point of the sweep, which is the most specific one.
pub fn youden_cutpoint(curve: &RocCurve) -> Option<Cutpoint> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, point) in curve.points.iter().enumerate() {
        if !point.threshold.is_finite() {
            continue;
        }
        let j = point.tpr - point.fpr;
        match best {
            Some((_, best_j)) if j <= best_j => {}
            _ => best = Some((idx, j)),
        }
    }
    let (idx, youden_j) = best?;
    let point = &curve.points[idx];

    let tp = point.tp;
    let fp = point.fp;
    let fn_ = curve.n_cases - tp;
    let tn = curve.n_controls - fp;
    let ratio = |num: usize, den: usize| {
        if den == 0 {
            None
        } else {
            Some(num as f64 / den as f64)
        }
    };

    Some(Cutpoint {
        threshold: point.threshold,
        direction: curve.direction,
        sensitivity: point.tpr,
        specificity: 1.0 - point.fpr,
        youden_j,
        ppv: ratio(tp, tp + fp),
        npv: ratio(tn, tn + fn_),
        accuracy: (tp + tn) as f64 / (curve.n_cases + curve.n_controls) as f64,
        tp,
        fp,
        tn,
        fn_,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/cutpoint.rs"]
mod tests;
