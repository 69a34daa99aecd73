use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::model::thresholds::AnalysisProfile;
use crate::pipeline::stage1_outcomes::Stage1Output;
use crate::pipeline::stage2_discrimination::{CompositeDiscrimination, Stage2Output};
use crate::pipeline::stage3_tertiles::TertileAnalysis;
use crate::report::json::render_summary_json;
use crate::report::plots::{ForestEntry, RocSeries, render_forest_svg, render_roc_svg};
use crate::report::text::render_report_text;
use crate::report::{
    NA, ReportError, SummaryData, ToolInfo, collect_caveats, format_fixed, format_opt, format_p,
};

pub const AUC_SUMMARY_CSV: &str = "auc_summary.csv";
pub const TERTILE_OR_CSV: &str = "tertile_odds_ratios.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const REPORT_TXT: &str = "report.txt";
pub const ROC_SVG: &str = "roc_curves.svg";
pub const FOREST_SVG: &str = "tertile_odds_ratios.svg";

#[derive(Debug, Clone)]
pub struct Stage4Input<'a> {
    pub tool: &'a ToolInfo,
    pub input_path: &'a Path,
    pub profile: &'a AnalysisProfile,
    pub outcomes: &'a Stage1Output,
    pub discrimination: &'a Stage2Output,
    pub tertiles: &'a [TertileAnalysis],
}

/// Writes every output into `out_dir` and returns the paths written.
pub fn write_reports(input: &Stage4Input<'_>, out_dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    let auc_path = out_dir.join(AUC_SUMMARY_CSV);
    write_auc_csv(&auc_path, &input.discrimination.composites)?;
    written.push(auc_path);

    let tertile_path = out_dir.join(TERTILE_OR_CSV);
    write_tertile_csv(&tertile_path, input.tertiles)?;
    written.push(tertile_path);

    let caveats = collect_caveats(
        &input.outcomes.summary,
        &input.discrimination.composites,
        &input.discrimination.comparison,
        input.tertiles,
    );
    let summary = SummaryData {
        tool: input.tool,
        input: input.input_path.display().to_string(),
        profile: input.profile,
        outcome: &input.outcomes.summary,
        discrimination: &input.discrimination.composites,
        comparison: &input.discrimination.comparison,
        tertiles: input.tertiles,
        caveats,
    };

    let json_path = out_dir.join(SUMMARY_JSON);
    fs::write(&json_path, render_summary_json(&summary)?)?;
    written.push(json_path);

    let report_path = out_dir.join(REPORT_TXT);
    fs::write(&report_path, render_report_text(&summary))?;
    written.push(report_path);

    if input.profile.plots {
        let roc_path = out_dir.join(ROC_SVG);
        render_roc_svg(&roc_path, &roc_series(&input.discrimination.composites))?;
        written.push(roc_path);

        let forest_path = out_dir.join(FOREST_SVG);
        render_forest_svg(&forest_path, &forest_entries(input.tertiles))?;
        written.push(forest_path);
    }

    for path in &written {
        info!(path = %path.display(), "wrote output");
    }
    Ok(written)
}

fn roc_series(composites: &[CompositeDiscrimination]) -> Vec<RocSeries<'_>> {
    composites
        .iter()
        .filter_map(|c| {
            let eval = c.evaluation.as_ref()?;
            let ci = eval
                .ci
                .as_ref()
                .map(|ci| format!(" ({}-{})", format_fixed(ci.lower, 3), format_fixed(ci.upper, 3)))
                .unwrap_or_default();
            Some(RocSeries {
                label: format!("{}: AUC {}{}", c.composite.label(), format_fixed(eval.auc, 3), ci),
                curve: &eval.curve,
            })
        })
        .collect()
}

fn forest_entries(tertiles: &[TertileAnalysis]) -> Vec<ForestEntry> {
    let mut out = Vec::new();
    for (group, t) in tertiles.iter().enumerate() {
        for row in &t.rows {
            if let Some(or) = &row.odds_ratio {
                out.push(ForestEntry {
                    label: format!("{} {}", t.composite.name(), row.tertile.label()),
                    group,
                    odds_ratio: or.odds_ratio,
                    ci_lower: or.ci_lower,
                    ci_upper: or.ci_upper,
                });
            }
        }
    }
    out
}

fn status(c: &CompositeDiscrimination) -> String {
    match &c.not_evaluable {
        Some(reason) => format!("not evaluable: {reason}"),
        None => "ok".to_string(),
    }
}

pub fn write_auc_csv(
    path: &Path,
    composites: &[CompositeDiscrimination],
) -> Result<(), ReportError> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record([
        "composite",
        "n",
        "n_ndi",
        "direction",
        "auc",
        "auc_ci_lower",
        "auc_ci_upper",
        "auc_se_boot",
        "n_boot",
        "cutpoint",
        "sensitivity",
        "specificity",
        "youden_j",
        "ppv",
        "npv",
        "accuracy",
        "tp",
        "fp",
        "tn",
        "fn",
        "status",
    ])?;

    for c in composites {
        let mut row = vec![
            c.composite.name().to_string(),
            c.n.to_string(),
            c.n_ndi.to_string(),
        ];
        match &c.evaluation {
            Some(eval) => {
                let ci = eval.ci.as_ref();
                row.push(eval.direction.name().to_string());
                row.push(format_fixed(eval.auc, 3));
                row.push(format_opt(ci.map(|c| c.lower), 3));
                row.push(format_opt(ci.map(|c| c.upper), 3));
                row.push(format_opt(ci.map(|c| c.se), 3));
                row.push(ci.map(|c| c.n_boot.to_string()).unwrap_or_else(|| "0".to_string()));
                match &eval.cutpoint {
                    Some(cut) => {
                        row.push(format_fixed(cut.threshold, 3));
                        row.push(format_fixed(cut.sensitivity, 3));
                        row.push(format_fixed(cut.specificity, 3));
                        row.push(format_fixed(cut.youden_j, 3));
                        row.push(format_opt(cut.ppv, 3));
                        row.push(format_opt(cut.npv, 3));
                        row.push(format_fixed(cut.accuracy, 3));
                        row.push(cut.tp.to_string());
                        row.push(cut.fp.to_string());
                        row.push(cut.tn.to_string());
                        row.push(cut.fn_.to_string());
                    }
                    None => row.extend(std::iter::repeat_n(NA.to_string(), 11)),
                }
            }
            None => row.extend(std::iter::repeat_n(NA.to_string(), 17)),
        }
        row.push(status(c));
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_tertile_csv(path: &Path, tertiles: &[TertileAnalysis]) -> Result<(), ReportError> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record([
        "composite",
        "tertile",
        "n",
        "n_ndi",
        "ndi_prevalence",
        "odds_ratio",
        "or_ci_lower",
        "or_ci_upper",
        "p_value",
        "reference",
        "note",
    ])?;

    for t in tertiles {
        for row in &t.rows {
            let or = row.odds_ratio.as_ref();
            let (estimate, lower, upper, p) = if row.reference {
                (format_fixed(1.0, 2), NA.to_string(), NA.to_string(), NA.to_string())
            } else {
                (
                    format_opt(or.map(|o| o.odds_ratio), 2),
                    format_opt(or.map(|o| o.ci_lower), 2),
                    format_opt(or.map(|o| o.ci_upper), 2),
                    format_p(or.map(|o| o.p_value)),
                )
            };
            w.write_record([
                t.composite.name().to_string(),
                row.tertile.label().to_string(),
                row.n.to_string(),
                row.n_ndi.to_string(),
                format_opt(row.ndi_prevalence, 3),
                estimate,
                lower,
                upper,
                p,
                row.reference.to_string(),
                row.note.clone().unwrap_or_default(),
            ])?;
        }
        for cov in &t.covariates {
            w.write_record([
                t.composite.name().to_string(),
                cov.term.clone(),
                t.n_model.to_string(),
                NA.to_string(),
                NA.to_string(),
                format_fixed(cov.odds_ratio, 2),
                format_fixed(cov.ci_lower, 2),
                format_fixed(cov.ci_upper, 2),
                format_p(Some(cov.p_value)),
                "false".to_string(),
                "covariate (per unit)".to_string(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_report.rs"]
mod tests;
