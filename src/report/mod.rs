pub mod json;
pub mod plots;
pub mod text;

use serde::Serialize;
use thiserror::Error;

use crate::model::thresholds::AnalysisProfile;
use crate::pipeline::stage1_outcomes::OutcomeSummary;
use crate::pipeline::stage2_discrimination::{AucComparison, CompositeDiscrimination};
use crate::pipeline::stage3_tertiles::TertileAnalysis;
use crate::stats::bootstrap::BootstrapCi;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plot error: {0}")]
    Plot(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
    pub git_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData<'a> {
    pub tool: &'a ToolInfo,
    pub input: String,
    pub profile: &'a AnalysisProfile,
    pub outcome: &'a OutcomeSummary,
    pub discrimination: &'a [CompositeDiscrimination],
    pub comparison: &'a AucComparison,
    pub tertiles: &'a [TertileAnalysis],
    pub caveats: Vec<String>,
}

pub const NA: &str = "NA";

pub fn format_fixed(v: f64, digits: usize) -> String {
    if v.is_finite() {
        format!("{:.*}", digits, v)
    } else {
        NA.to_string()
    }
}

pub fn format_opt(v: Option<f64>, digits: usize) -> String {
    v.map(|x| format_fixed(x, digits))
        .unwrap_or_else(|| NA.to_string())
}

pub fn format_p(p: Option<f64>) -> String {
    match p {
        Some(p) if p.is_finite() && p < 1e-4 => "<0.0001".to_string(),
        Some(p) => format_fixed(p, 4),
        None => NA.to_string(),
    }
}

pub fn format_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{:.1}%", x * 100.0))
        .unwrap_or_else(|| NA.to_string())
}

/// `0.812 (0.741-0.873)`, or just the estimate when no interval exists.
pub fn format_estimate_ci(estimate: f64, ci: Option<(f64, f64)>, digits: usize) -> String {
    match ci {
        Some((lo, hi)) => format!(
            "{} ({}-{})",
            format_fixed(estimate, digits),
            format_fixed(lo, digits),
            format_fixed(hi, digits)
        ),
        None => format_fixed(estimate, digits),
    }
}

pub fn ci_bounds(ci: Option<&BootstrapCi>) -> Option<(f64, f64)> {
    ci.map(|c| (c.lower, c.upper))
}

/// Caveats collected from every stage, in report order.
pub fn collect_caveats(
    outcome: &OutcomeSummary,
    discrimination: &[CompositeDiscrimination],
    comparison: &AucComparison,
    tertiles: &[TertileAnalysis],
) -> Vec<String> {
    let mut out = Vec::new();
    let excluded = outcome.n_total - outcome.n_evaluable;
    if excluded > 0 {
        out.push(format!(
            "{excluded} of {} participants have no evaluable NDI outcome",
            outcome.n_total
        ));
    }
    for d in discrimination {
        if d.n < outcome.n_evaluable {
            out.push(format!(
                "{}: {} outcome-evaluable participants lack a score",
                d.composite.name(),
                outcome.n_evaluable - d.n
            ));
        }
        if let Some(reason) = &d.not_evaluable {
            out.push(format!("{}: ROC not evaluable ({reason})", d.composite.name()));
        }
    }
    if let Some(reason) = &comparison.not_evaluable {
        out.push(format!("AUC comparison not evaluable ({reason})"));
    }
    for t in tertiles {
        out.extend(t.alignment.overlaps.iter().cloned());
        for note in &t.notes {
            out.push(format!("{}: {note}", t.composite.name()));
        }
        for row in &t.rows {
            if let Some(note) = &row.note {
                out.push(format!("{} {}: {note}", t.composite.name(), row.tertile.label()));
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
