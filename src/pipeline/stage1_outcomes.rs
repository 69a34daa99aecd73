use serde::Serialize;
use tracing::info;

use crate::model::cohort::{Cohort, Domain};
use crate::model::thresholds::NdiDefinition;

#[derive(Debug, Clone, Serialize)]
pub struct DomainSummary {
    pub domain: Domain,
    pub n_evaluable: usize,
    pub n_impaired: usize,
    pub prevalence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub threshold: f64,
    pub n_total: usize,
    pub n_evaluable: usize,
    pub n_ndi: usize,
    pub ndi_prevalence: Option<f64>,
    pub domains: Vec<DomainSummary>,
}

#[derive(Debug, Clone)]
pub struct Stage1Output {
    /// Row-aligned with `Cohort::participants`.
    pub ndi: Vec<Option<bool>>,
    pub impaired: Vec<[Option<bool>; 3]>,
    pub summary: OutcomeSummary,
}

pub fn fraction(num: usize, den: usize) -> Option<f64> {
    if den == 0 {
        None
    } else {
        Some(num as f64 / den as f64)
    }
}

/// Three-valued "any": a single observed impairment decides the outcome,
/// otherwise every domain has to be observed to rule NDI out.
pub fn ndi_from_domains(impaired: &[Option<bool>; 3]) -> Option<bool> {
    if impaired.iter().any(|d| *d == Some(true)) {
        Some(true)
    } else if impaired.iter().all(Option::is_some) {
        Some(false)
    } else {
        None
    }
}

pub fn run_stage1(cohort: &Cohort, definition: &NdiDefinition) -> Stage1Output {
    let n_total = cohort.len();
    let mut ndi = Vec::with_capacity(n_total);
    let mut impaired = Vec::with_capacity(n_total);

    for participant in &cohort.participants {
        let mut flags = [None; 3];
        for domain in Domain::ALL {
            flags[domain.index()] = participant
                .domain(domain)
                .map(|score| definition.is_impaired(score));
        }
        ndi.push(ndi_from_domains(&flags));
        impaired.push(flags);
    }

    let n_evaluable = ndi.iter().filter(|v| v.is_some()).count();
    let n_ndi = ndi.iter().filter(|v| **v == Some(true)).count();
    let domains = Domain::ALL
        .iter()
        .map(|&domain| {
            let column = impaired.iter().map(|row| row[domain.index()]);
            let n_evaluable = column.clone().filter(Option::is_some).count();
            let n_impaired = column.filter(|v| *v == Some(true)).count();
            DomainSummary {
                domain,
                n_evaluable,
                n_impaired,
                prevalence: fraction(n_impaired, n_evaluable),
            }
        })
        .collect();

    let summary = OutcomeSummary {
        threshold: definition.threshold,
        n_total,
        n_evaluable,
        n_ndi,
        ndi_prevalence: fraction(n_ndi, n_evaluable),
        domains,
    };
    info!(
        n_total,
        n_evaluable,
        n_ndi,
        threshold = definition.threshold,
        "derived NDI outcome"
    );

    Stage1Output {
        ndi,
        impaired,
        summary,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_outcomes.rs"]
mod tests;
