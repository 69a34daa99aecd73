use ndarray::{Array1, Array2};
use serde::Serialize;
use tracing::{info, warn};

use crate::model::cohort::{Cohort, CompositeKind, Domain, RiskTertile};
use crate::pipeline::stage1_outcomes::{Stage1Output, fraction};
use crate::pipeline::stage2_discrimination::complete_cases;
use crate::stats::logistic::{OddsRatio, fit_logistic};
use crate::stats::roc::Direction;

pub const INTERCEPT: &str = "(Intercept)";
pub const REFERENCE: RiskTertile = RiskTertile::Low;

#[derive(Debug, Clone, Serialize)]
pub struct TertileRow {
    pub tertile: RiskTertile,
    pub n: usize,
    pub n_ndi: usize,
    pub ndi_prevalence: Option<f64>,
    pub domain_prevalence: [Option<f64>; 3],
    pub reference: bool,
    pub odds_ratio: Option<OddsRatio>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRange {
    pub tertile: RiskTertile,
    pub n: usize,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TertileAlignment {
    pub direction: Direction,
    pub ranges: Vec<ScoreRange>,
    pub overlaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TertileAnalysis {
    pub composite: CompositeKind,
    pub n: usize,
    pub n_ndi: usize,
    pub n_model: usize,
    pub rows: Vec<TertileRow>,
    pub covariates: Vec<OddsRatio>,
    pub converged: Option<bool>,
    pub deviance: Option<f64>,
    pub null_deviance: Option<f64>,
    pub notes: Vec<String>,
    pub alignment: TertileAlignment,
}

#[derive(Debug, Clone)]
pub struct Stage3Params {
    pub conf_level: f64,
    /// Orientation used to order tertile score ranges; `Auto` resolves the
    /// same way as the ROC analysis.
    pub direction: Direction,
}

pub fn run_stage3(
    cohort: &Cohort,
    outcomes: &Stage1Output,
    params: &Stage3Params,
) -> Vec<TertileAnalysis> {
    CompositeKind::ALL
        .iter()
        .map(|&kind| analyse_composite(cohort, outcomes, kind, params))
        .collect()
}

fn degenerate_reason(n: usize, n_ndi: usize) -> Option<&'static str> {
    if n == 0 {
        Some("no participants")
    } else if n_ndi == 0 {
        Some("no NDI events")
    } else if n_ndi == n {
        Some("all participants have NDI")
    } else {
        None
    }
}

pub fn analyse_composite(
    cohort: &Cohort,
    outcomes: &Stage1Output,
    kind: CompositeKind,
    params: &Stage3Params,
) -> TertileAnalysis {
    let direction = alignment_direction(cohort, outcomes, kind, params.direction);
    let alignment = check_alignment(cohort, kind, direction);

    // (row index, tertile, ndi)
    let cases: Vec<(usize, RiskTertile, bool)> = cohort
        .participants
        .iter()
        .enumerate()
        .filter(|(_, p)| p.covariates_complete())
        .filter_map(|(i, p)| Some((i, p.tertile(kind)?, outcomes.ndi[i]?)))
        .collect();

    let mut rows: Vec<TertileRow> = RiskTertile::ALL
        .iter()
        .map(|&tertile| {
            let members: Vec<&(usize, RiskTertile, bool)> =
                cases.iter().filter(|c| c.1 == tertile).collect();
            let n = members.len();
            let n_ndi = members.iter().filter(|c| c.2).count();
            let mut domain_prevalence = [None; 3];
            for domain in Domain::ALL {
                let observed: Vec<bool> = members
                    .iter()
                    .filter_map(|c| outcomes.impaired[c.0][domain.index()])
                    .collect();
                let impaired = observed.iter().filter(|&&v| v).count();
                domain_prevalence[domain.index()] = fraction(impaired, observed.len());
            }
            TertileRow {
                tertile,
                n,
                n_ndi,
                ndi_prevalence: fraction(n_ndi, n),
                domain_prevalence,
                reference: tertile == REFERENCE,
                odds_ratio: None,
                note: None,
            }
        })
        .collect();

    let mut analysis = TertileAnalysis {
        composite: kind,
        n: cases.len(),
        n_ndi: cases.iter().filter(|c| c.2).count(),
        n_model: 0,
        rows: Vec::new(),
        covariates: Vec::new(),
        converged: None,
        deviance: None,
        null_deviance: None,
        notes: Vec::new(),
        alignment,
    };

    let reference = &mut rows[REFERENCE.index()];
    if let Some(reason) = degenerate_reason(reference.n, reference.n_ndi) {
        let note = format!("reference tertile ({}) has {reason}", REFERENCE.label());
        warn!(composite = kind.name(), %note, "odds ratios not estimable");
        reference.note = Some(note.clone());
        analysis.notes.push(format!("odds ratios not estimable: {note}"));
        analysis.rows = rows;
        return analysis;
    }

    let mut kept = Vec::new();
    for row in rows.iter_mut().filter(|r| !r.reference) {
        match degenerate_reason(row.n, row.n_ndi) {
            Some(reason) => {
                warn!(
                    composite = kind.name(),
                    tertile = row.tertile.label(),
                    reason,
                    "tertile excluded from the model"
                );
                row.note = Some(format!("{reason}; odds ratio not estimable"));
            }
            None => kept.push(row.tertile),
        }
    }

    let model_rows: Vec<&(usize, RiskTertile, bool)> = cases
        .iter()
        .filter(|c| c.1 == REFERENCE || kept.contains(&c.1))
        .collect();
    let mut terms = vec![INTERCEPT.to_string()];
    terms.extend(kept.iter().map(|t| t.label().to_string()));
    terms.extend(cohort.covariate_names.iter().cloned());

    let n_model = model_rows.len();
    let mut x = Array2::<f64>::zeros((n_model, terms.len()));
    let mut y = Array1::<f64>::zeros(n_model);
    for (r, &&(idx, tertile, ndi)) in model_rows.iter().enumerate() {
        x[[r, 0]] = 1.0;
        if let Some(pos) = kept.iter().position(|&t| t == tertile) {
            x[[r, 1 + pos]] = 1.0;
        }
        for (c, value) in cohort.participants[idx].covariates.iter().enumerate() {
            x[[r, 1 + kept.len() + c]] = value.unwrap_or(f64::NAN);
        }
        y[r] = if ndi { 1.0 } else { 0.0 };
    }
    analysis.n_model = n_model;

    match fit_logistic(x.view(), y.view(), &terms) {
        Ok(fit) => {
            if !fit.converged {
                warn!(
                    composite = kind.name(),
                    iterations = fit.iterations,
                    "logistic model did not converge"
                );
                analysis.notes.push(format!(
                    "logistic model did not converge after {} iterations",
                    fit.iterations
                ));
            }
            for or in fit.odds_ratios(params.conf_level) {
                match rows.iter_mut().find(|r| r.tertile.label() == or.term) {
                    Some(row) => row.odds_ratio = Some(or),
                    None => analysis.covariates.push(or),
                }
            }
            info!(
                composite = kind.name(),
                n = n_model,
                deviance = fit.deviance,
                converged = fit.converged,
                "tertile logistic model fitted"
            );
            analysis.converged = Some(fit.converged);
            analysis.deviance = Some(fit.deviance);
            analysis.null_deviance = Some(fit.null_deviance);
        }
        Err(err) => {
            warn!(composite = kind.name(), error = %err, "logistic model could not be fitted");
            analysis
                .notes
                .push(format!("logistic model could not be fitted: {err}"));
        }
    }

    analysis.rows = rows;
    analysis
}

/// Falls back to `HigherIsRisk` when `Auto` has no cases or no controls to
/// compare.
fn alignment_direction(
    cohort: &Cohort,
    outcomes: &Stage1Output,
    kind: CompositeKind,
    direction: Direction,
) -> Direction {
    if direction != Direction::Auto {
        return direction;
    }
    let (scores, labels) = complete_cases(cohort, outcomes, kind);
    if labels.contains(&true) && labels.contains(&false) {
        direction.resolve(&scores, &labels)
    } else {
        Direction::HigherIsRisk
    }
}

/// Score ranges per tertile label. Moving from Low to High Risk, scores should
/// rise (`HigherIsRisk`) or fall (`LowerIsRisk`); consecutive tertiles whose
/// ranges overlap suggest that labels and scores are misaligned.
pub fn check_alignment(
    cohort: &Cohort,
    kind: CompositeKind,
    direction: Direction,
) -> TertileAlignment {
    let mut ranges: Vec<ScoreRange> = Vec::new();
    for tertile in RiskTertile::ALL {
        let values: Vec<f64> = cohort
            .participants
            .iter()
            .filter(|p| p.tertile(kind) == Some(tertile))
            .filter_map(|p| p.score(kind))
            .collect();
        if values.is_empty() {
            continue;
        }
        ranges.push(ScoreRange {
            tertile,
            n: values.len(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        });
    }

    let mut overlaps = Vec::new();
    for pair in ranges.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        let overlap = match direction {
            Direction::LowerIsRisk if lo.min < hi.max => Some(format!(
                "min {:.3} is below {} max {:.3}",
                lo.min,
                hi.tertile.label(),
                hi.max
            )),
            Direction::LowerIsRisk => None,
            _ if lo.max > hi.min => Some(format!(
                "max {:.3} exceeds {} min {:.3}",
                lo.max,
                hi.tertile.label(),
                hi.min
            )),
            _ => None,
        };
        if let Some(detail) = overlap {
            let msg = format!(
                "{} scores ({}): {} {detail}",
                kind.name(),
                direction.name(),
                lo.tertile.label()
            );
            warn!(composite = kind.name(), "{msg}");
            overlaps.push(msg);
        }
    }
    TertileAlignment {
        direction,
        ranges,
        overlaps,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_tertiles.rs"]
mod tests;
