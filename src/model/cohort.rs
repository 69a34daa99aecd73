use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTertile {
    Low,
    Moderate,
    High,
}

impl RiskTertile {
    pub const ALL: [RiskTertile; 3] = [RiskTertile::Low, RiskTertile::Moderate, RiskTertile::High];

    pub fn label(self) -> &'static str {
        match self {
            RiskTertile::Low => "Low Risk",
            RiskTertile::Moderate => "Moderate Risk",
            RiskTertile::High => "High Risk",
        }
    }

    pub fn index(self) -> usize {
        match self {
            RiskTertile::Low => 0,
            RiskTertile::Moderate => 1,
            RiskTertile::High => 2,
        }
    }

    /// Accepts `Low`, `Moderate`/`Medium`, `High` with an optional `Risk`
    /// suffix, or the codes `1`..`3`.
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        let stem = lower
            .strip_suffix("risk")
            .map(|s| s.trim_end_matches([' ', '_', '-']))
            .unwrap_or(&lower);
        match stem {
            "low" | "1" => Some(RiskTertile::Low),
            "moderate" | "medium" | "2" => Some(RiskTertile::Moderate),
            "high" | "3" => Some(RiskTertile::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Cognitive,
    Language,
    Motor,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Cognitive, Domain::Language, Domain::Motor];

    pub fn name(self) -> &'static str {
        match self {
            Domain::Cognitive => "cognitive",
            Domain::Language => "language",
            Domain::Motor => "motor",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Domain::Cognitive => 0,
            Domain::Language => 1,
            Domain::Motor => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Supervised,
    Unsupervised,
}

impl CompositeKind {
    pub const ALL: [CompositeKind; 2] = [CompositeKind::Supervised, CompositeKind::Unsupervised];

    pub fn name(self) -> &'static str {
        match self {
            CompositeKind::Supervised => "supervised",
            CompositeKind::Unsupervised => "unsupervised",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompositeKind::Supervised => "Supervised composite",
            CompositeKind::Unsupervised => "Unsupervised composite",
        }
    }

    pub fn index(self) -> usize {
        match self {
            CompositeKind::Supervised => 0,
            CompositeKind::Unsupervised => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub domains: [Option<f64>; 3],
    pub scores: [Option<f64>; 2],
    pub tertiles: [Option<RiskTertile>; 2],
    pub covariates: Vec<Option<f64>>,
}

impl Participant {
    pub fn domain(&self, domain: Domain) -> Option<f64> {
        self.domains[domain.index()]
    }

    pub fn score(&self, kind: CompositeKind) -> Option<f64> {
        self.scores[kind.index()]
    }

    pub fn tertile(&self, kind: CompositeKind) -> Option<RiskTertile> {
        self.tertiles[kind.index()]
    }

    pub fn covariates_complete(&self) -> bool {
        self.covariates.iter().all(Option::is_some)
    }
}

/// Participant table in file order. Analyses select rows by index and never
/// reorder this vector.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub source: PathBuf,
    pub participants: Vec<Participant>,
    pub covariate_names: Vec<String>,
}

impl Cohort {
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/cohort.rs"]
mod tests;
