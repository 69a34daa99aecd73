use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::model::cohort::{Cohort, CompositeKind};
use crate::pipeline::stage1_outcomes::Stage1Output;
use crate::stats::StatsError;
use crate::stats::bootstrap::{
    AucDifference, BootstrapCi, bootstrap_auc_ci, bootstrap_auc_difference,
};
use crate::stats::cutpoint::{Cutpoint, youden_cutpoint};
use crate::stats::roc::{Direction, RocCurve, roc_curve};

/// Seed offset of the paired comparison, kept apart from per-composite seeds.
const COMPARISON_SEED_OFFSET: u64 = 100;

#[derive(Debug, Clone)]
pub struct Stage2Params {
    pub direction: Direction,
    pub n_boot: usize,
    pub conf_level: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RocEvaluation {
    pub direction: Direction,
    pub auc: f64,
    pub ci: Option<BootstrapCi>,
    pub cutpoint: Option<Cutpoint>,
    #[serde(skip)]
    pub curve: RocCurve,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositeDiscrimination {
    pub composite: CompositeKind,
    pub n: usize,
    pub n_ndi: usize,
    pub evaluation: Option<RocEvaluation>,
    pub not_evaluable: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AucComparison {
    pub first: CompositeKind,
    pub second: CompositeKind,
    pub result: Option<AucDifference>,
    pub not_evaluable: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Stage2Output {
    pub composites: Vec<CompositeDiscrimination>,
    pub comparison: AucComparison,
}

/// Complete cases (score and NDI present) for one composite, in row order.
pub fn complete_cases(
    cohort: &Cohort,
    outcomes: &Stage1Output,
    kind: CompositeKind,
) -> (Vec<f64>, Vec<bool>) {
    let mut scores = Vec::new();
    let mut labels = Vec::new();
    for (participant, ndi) in cohort.participants.iter().zip(&outcomes.ndi) {
        if let (Some(score), Some(ndi)) = (participant.score(kind), *ndi) {
            scores.push(score);
            labels.push(ndi);
        }
    }
    (scores, labels)
}

pub fn evaluate_composite(
    kind: CompositeKind,
    scores: &[f64],
    labels: &[bool],
    params: &Stage2Params,
) -> Result<RocEvaluation, StatsError> {
    let curve = roc_curve(scores, labels, params.direction)?;
    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(kind.index() as u64));
    let ci = bootstrap_auc_ci(
        scores,
        labels,
        curve.direction,
        params.n_boot,
        params.conf_level,
        &mut rng,
    )?;
    let cutpoint = youden_cutpoint(&curve);
    Ok(RocEvaluation {
        direction: curve.direction,
        auc: curve.auc,
        ci,
        cutpoint,
        curve,
    })
}

pub fn run_stage2(cohort: &Cohort, outcomes: &Stage1Output, params: &Stage2Params) -> Stage2Output {
    let mut composites = Vec::with_capacity(CompositeKind::ALL.len());
    for kind in CompositeKind::ALL {
        let (scores, labels) = complete_cases(cohort, outcomes, kind);
        let n_ndi = labels.iter().filter(|&&l| l).count();
        let mut entry = CompositeDiscrimination {
            composite: kind,
            n: scores.len(),
            n_ndi,
            evaluation: None,
            not_evaluable: None,
        };
        match evaluate_composite(kind, &scores, &labels, params) {
            Ok(eval) => {
                info!(
                    composite = kind.name(),
                    n = entry.n,
                    n_ndi,
                    auc = eval.auc,
                    direction = eval.direction.name(),
                    "ROC evaluated"
                );
                if eval.auc < 0.5 {
                    warn!(
                        composite = kind.name(),
                        auc = eval.auc,
                        "AUC below 0.5 for the chosen direction"
                    );
                }
                entry.evaluation = Some(eval);
            }
            Err(err) => {
                warn!(composite = kind.name(), error = %err, "composite not evaluable");
                entry.not_evaluable = Some(err.to_string());
            }
        }
        composites.push(entry);
    }

    let comparison = compare_composites(cohort, outcomes, params, &composites);
    Stage2Output {
        composites,
        comparison,
    }
}

fn compare_composites(
    cohort: &Cohort,
    outcomes: &Stage1Output,
    params: &Stage2Params,
    composites: &[CompositeDiscrimination],
) -> AucComparison {
    let [first, second] = CompositeKind::ALL;
    let mut out = AucComparison {
        first,
        second,
        result: None,
        not_evaluable: None,
    };

    let directions: Option<Vec<Direction>> = composites
        .iter()
        .map(|c| c.evaluation.as_ref().map(|e| e.direction))
        .collect();
    let Some(directions) = directions else {
        out.not_evaluable = Some("at least one composite is not evaluable".to_string());
        return out;
    };

    let mut scores_a = Vec::new();
    let mut scores_b = Vec::new();
    let mut labels = Vec::new();
    for (participant, ndi) in cohort.participants.iter().zip(&outcomes.ndi) {
        if let (Some(a), Some(b), Some(ndi)) =
            (participant.score(first), participant.score(second), *ndi)
        {
            scores_a.push(a);
            scores_b.push(b);
            labels.push(ndi);
        }
    }

    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(COMPARISON_SEED_OFFSET));
    match bootstrap_auc_difference(
        &scores_a,
        directions[0],
        &scores_b,
        directions[1],
        &labels,
        params.n_boot,
        params.conf_level,
        &mut rng,
    ) {
        Ok(diff) => {
            info!(
                n = diff.n,
                difference = diff.difference,
                p_value = ?diff.p_value,
                "paired AUC comparison"
            );
            out.result = Some(diff);
        }
        Err(err) => {
            warn!(error = %err, "paired AUC comparison not evaluable");
            out.not_evaluable = Some(err.to_string());
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_discrimination.rs"]
mod tests;
