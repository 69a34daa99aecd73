use std::path::PathBuf;

use crate::model::cohort::{Cohort, Participant, RiskTertile};

pub fn participant(
    id: &str,
    domains: [Option<f64>; 3],
    scores: [Option<f64>; 2],
    tertiles: [Option<RiskTertile>; 2],
) -> Participant {
    Participant {
        id: id.to_string(),
        domains,
        scores,
        tertiles,
        covariates: Vec::new(),
    }
}

pub fn cohort_of(participants: Vec<Participant>) -> Cohort {
    Cohort {
        source: PathBuf::from("fixture.csv"),
        participants,
        covariate_names: Vec::new(),
    }
}

fn tertile_of(value: f64) -> RiskTertile {
    if value < 1.0 / 3.0 {
        RiskTertile::Low
    } else if value < 2.0 / 3.0 {
        RiskTertile::Moderate
    } else {
        RiskTertile::High
    }
}

/// 90 participants; the supervised score tracks cognitive impairment closely,
/// the unsupervised one only loosely. Every tertile holds both outcomes.
pub fn synthetic_cohort() -> Cohort {
    let mut participants = Vec::new();
    for i in 0..90usize {
        let r = ((i * 37) % 90) as f64 / 90.0;
        let jitter = (((i * 13) % 11) as f64 - 5.0) * 3.0;
        let cognitive = 100.0 - 30.0 * r + jitter;
        let noise = ((i * 7) % 10) as f64 / 10.0;
        let supervised = r;
        let unsupervised = 0.5 * r + 0.5 * noise;
        let mut p = participant(
            &format!("p{i:03}"),
            [Some(cognitive), Some(100.0), Some(98.0)],
            [Some(supervised), Some(unsupervised)],
            [Some(tertile_of(supervised)), Some(tertile_of(unsupervised))],
        );
        p.covariates = vec![Some(24.0 + (i % 8) as f64)];
        participants.push(p);
    }
    let mut cohort = cohort_of(participants);
    cohort.covariate_names = vec!["ga_weeks".to_string()];
    cohort
}
