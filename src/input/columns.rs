use crate::input::InputError;

/// Header names of the participant table.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub id: String,
    pub domains: [String; 3],
    pub scores: [String; 2],
    pub tertiles: [String; 2],
}

impl ColumnMap {
    pub fn default_v1() -> Self {
        Self {
            id: "participant_id".to_string(),
            domains: [
                "cognitive_composite".to_string(),
                "language_composite".to_string(),
                "motor_composite".to_string(),
            ],
            scores: [
                "supervised_risk_score".to_string(),
                "unsupervised_risk_score".to_string(),
            ],
            tertiles: [
                "supervised_risk_tertile".to_string(),
                "unsupervised_risk_tertile".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub id: usize,
    pub domains: [usize; 3],
    pub scores: [usize; 2],
    pub tertiles: [usize; 2],
    pub covariates: Vec<usize>,
}

pub fn resolve_columns(
    header: &[String],
    map: &ColumnMap,
    covariates: &[String],
) -> Result<ResolvedColumns, InputError> {
    let find = |name: &str| -> Result<usize, InputError> {
        header
            .iter()
            .position(|h| h == name)
            .or_else(|| header.iter().position(|h| h.eq_ignore_ascii_case(name)))
            .ok_or_else(|| InputError::MissingColumn(name.to_string()))
    };

    let mut domains = [0usize; 3];
    for (slot, name) in domains.iter_mut().zip(map.domains.iter()) {
        *slot = find(name)?;
    }
    let mut scores = [0usize; 2];
    for (slot, name) in scores.iter_mut().zip(map.scores.iter()) {
        *slot = find(name)?;
    }
    let mut tertiles = [0usize; 2];
    for (slot, name) in tertiles.iter_mut().zip(map.tertiles.iter()) {
        *slot = find(name)?;
    }
    let covariates = covariates
        .iter()
        .map(|name| find(name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedColumns {
        id: find(&map.id)?,
        domains,
        scores,
        tertiles,
        covariates,
    })
}
