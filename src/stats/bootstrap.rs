use rand::Rng;
use serde::Serialize;

use crate::stats::normal::two_sided_p;
use crate::stats::roc::{Direction, auc_from_sorted_controls, validate_inputs};
use crate::stats::{StatsError, quantile_sorted, sample_sd};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapCi {
    pub lower: f64,
    pub upper: f64,
    pub se: f64,
    pub n_boot: usize,
    pub conf_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AucDifference {
    pub n: usize,
    pub n_cases: usize,
    pub auc_a: f64,
    pub auc_b: f64,
    pub difference: f64,
    pub ci: Option<BootstrapCi>,
    pub z: Option<f64>,
    pub p_value: Option<f64>,
}

/// Cases and controls resampled separately so each replicate keeps the
/// observed class sizes.
struct StratifiedSampler {
    cases: Vec<usize>,
    controls: Vec<usize>,
}

impl StratifiedSampler {
    fn new(labels: &[bool]) -> Self {
        let mut cases = Vec::new();
        let mut controls = Vec::new();
        for (i, &l) in labels.iter().enumerate() {
            if l {
                cases.push(i);
            } else {
                controls.push(i);
            }
        }
        Self { cases, controls }
    }

    fn draw<R: Rng>(&self, rng: &mut R, case_buf: &mut Vec<usize>, control_buf: &mut Vec<usize>) {
        case_buf.clear();
        control_buf.clear();
        for _ in 0..self.cases.len() {
            case_buf.push(self.cases[rng.gen_range(0..self.cases.len())]);
        }
        for _ in 0..self.controls.len() {
            control_buf.push(self.controls[rng.gen_range(0..self.controls.len())]);
        }
    }
}

fn resampled_auc(
    oriented: &[f64],
    case_idx: &[usize],
    control_idx: &[usize],
    scratch: &mut Vec<f64>,
) -> f64 {
    scratch.clear();
    scratch.extend(control_idx.iter().map(|&i| oriented[i]));
    scratch.sort_by(|a, b| a.total_cmp(b));
    let cases: Vec<f64> = case_idx.iter().map(|&i| oriented[i]).collect();
    auc_from_sorted_controls(&cases, scratch)
}

fn percentile_ci(mut replicates: Vec<f64>, conf_level: f64) -> Option<BootstrapCi> {
    replicates.retain(|v| v.is_finite());
    if replicates.is_empty() {
        return None;
    }
    let se = sample_sd(&replicates);
    replicates.sort_by(|a, b| a.total_cmp(b));
    let alpha = 1.0 - conf_level;
    Some(BootstrapCi {
        lower: quantile_sorted(&replicates, alpha / 2.0),
        upper: quantile_sorted(&replicates, 1.0 - alpha / 2.0),
        se,
        n_boot: replicates.len(),
        conf_level,
    })
}

/// Percentile CI of the AUC from stratified bootstrap replicates. `direction`
/// must already be resolved; it is held fixed across replicates. Returns
/// `Ok(None)` when `n_boot` is zero.
pub fn bootstrap_auc_ci<R: Rng>(
    scores: &[f64],
    labels: &[bool],
    direction: Direction,
    n_boot: usize,
    conf_level: f64,
    rng: &mut R,
) -> Result<Option<BootstrapCi>, StatsError> {
    validate_inputs(scores, labels)?;
    if n_boot == 0 {
        return Ok(None);
    }
    let oriented: Vec<f64> = scores.iter().map(|&s| direction.orient(s)).collect();
    let sampler = StratifiedSampler::new(labels);

    let mut case_buf = Vec::with_capacity(sampler.cases.len());
    let mut control_buf = Vec::with_capacity(sampler.controls.len());
    let mut scratch = Vec::with_capacity(sampler.controls.len());
    let mut replicates = Vec::with_capacity(n_boot);
    for _ in 0..n_boot {
        sampler.draw(rng, &mut case_buf, &mut control_buf);
        replicates.push(resampled_auc(&oriented, &case_buf, &control_buf, &mut scratch));
    }
    Ok(percentile_ci(replicates, conf_level))
}

/// Paired comparison of two scores measured on the same participants.
/// Reports AUC(a) - AUC(b) with a percentile CI and a bootstrap z test.
#[allow(clippy::too_many_arguments)]
pub fn bootstrap_auc_difference<R: Rng>(
    scores_a: &[f64],
    direction_a: Direction,
    scores_b: &[f64],
    direction_b: Direction,
    labels: &[bool],
    n_boot: usize,
    conf_level: f64,
    rng: &mut R,
) -> Result<AucDifference, StatsError> {
    let (n_cases, _) = validate_inputs(scores_a, labels)?;
    validate_inputs(scores_b, labels)?;

    let oriented_a: Vec<f64> = scores_a.iter().map(|&s| direction_a.orient(s)).collect();
    let oriented_b: Vec<f64> = scores_b.iter().map(|&s| direction_b.orient(s)).collect();
    let sampler = StratifiedSampler::new(labels);

    let mut scratch = Vec::with_capacity(sampler.controls.len());
    let auc_a = resampled_auc(&oriented_a, &sampler.cases, &sampler.controls, &mut scratch);
    let auc_b = resampled_auc(&oriented_b, &sampler.cases, &sampler.controls, &mut scratch);
    let difference = auc_a - auc_b;

    let mut out = AucDifference {
        n: labels.len(),
        n_cases,
        auc_a,
        auc_b,
        difference,
        ci: None,
        z: None,
        p_value: None,
    };
    if n_boot == 0 {
        return Ok(out);
    }

    let mut case_buf = Vec::with_capacity(sampler.cases.len());
    let mut control_buf = Vec::with_capacity(sampler.controls.len());
    let mut replicates = Vec::with_capacity(n_boot);
    for _ in 0..n_boot {
        sampler.draw(rng, &mut case_buf, &mut control_buf);
        let a = resampled_auc(&oriented_a, &case_buf, &control_buf, &mut scratch);
        let b = resampled_auc(&oriented_b, &case_buf, &control_buf, &mut scratch);
        replicates.push(a - b);
    }

    out.ci = percentile_ci(replicates, conf_level);
    if let Some(ci) = &out.ci {
        if ci.se.is_finite() && ci.se > 0.0 {
            let z = difference / ci.se;
            out.z = Some(z);
            out.p_value = Some(two_sided_p(z));
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/bootstrap.rs"]
mod tests;
