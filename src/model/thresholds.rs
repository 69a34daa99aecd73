use serde::Serialize;

use crate::stats::roc::Direction;

/// Clinical NDI definition: any domain score strictly below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NdiDefinition {
    pub threshold: f64,
}

impl NdiDefinition {
    pub fn default_v1() -> Self {
        Self { threshold: 85.0 }
    }

    pub fn is_impaired(&self, score: f64) -> bool {
        score < self.threshold
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisProfile {
    pub ndi: NdiDefinition,
    pub n_boot: usize,
    pub seed: u64,
    pub conf_level: f64,
    pub direction: Direction,
    pub covariates: Vec<String>,
    pub plots: bool,
}

impl AnalysisProfile {
    pub fn default_v1() -> Self {
        Self {
            ndi: NdiDefinition::default_v1(),
            n_boot: 2000,
            seed: 20240131,
            conf_level: 0.95,
            direction: Direction::Auto,
            covariates: Vec::new(),
            plots: true,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.ndi.threshold.is_finite() {
            return Err("NDI threshold must be finite".to_string());
        }
        if !(self.conf_level > 0.0 && self.conf_level < 1.0) {
            return Err(format!(
                "confidence level must be in (0, 1), got {}",
                self.conf_level
            ));
        }
        for (i, name) in self.covariates.iter().enumerate() {
            if name.trim().is_empty() {
                return Err("covariate column name is empty".to_string());
            }
            if self.covariates[..i].contains(name) {
                return Err(format!("covariate {name} given more than once"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/thresholds.rs"]
mod tests;
