use std::fmt::Write;

use crate::pipeline::stage2_discrimination::CompositeDiscrimination;
use crate::pipeline::stage3_tertiles::TertileAnalysis;
use crate::report::{
    SummaryData, ci_bounds, format_estimate_ci, format_fixed, format_opt, format_p, format_pct,
};

pub fn render_report_text(data: &SummaryData<'_>) -> String {
    let mut out = String::new();

    out.push_str("Clinical Applicability of Composite Developmental-Risk Scores\n");
    out.push_str("=============================================================\n\n");
    let _ = writeln!(out, "Tool: {} {}", data.tool.name, data.tool.version);
    let _ = writeln!(out, "Input: {}", data.input);
    let _ = writeln!(
        out,
        "Bootstrap: {} stratified replicates, seed {}, {}% intervals\n",
        data.profile.n_boot,
        data.profile.seed,
        format_fixed(data.profile.conf_level * 100.0, 0)
    );

    render_outcome(&mut out, data);
    render_discrimination(&mut out, data.discrimination);
    render_comparison(&mut out, data);
    render_tertiles(&mut out, data.tertiles, data.profile.covariates.is_empty());

    out.push_str("5. Caveats\n");
    if data.caveats.is_empty() {
        out.push_str("None.\n");
    } else {
        for caveat in &data.caveats {
            let _ = writeln!(out, "- {caveat}");
        }
    }
    out
}

fn render_outcome(out: &mut String, data: &SummaryData<'_>) {
    let o = data.outcome;
    out.push_str("1. Cohort and outcome\n");
    let _ = writeln!(
        out,
        "NDI definition: any of cognitive, language or motor score < {}",
        format_fixed(o.threshold, 1)
    );
    let _ = writeln!(
        out,
        "Participants: {} total, {} with evaluable outcome",
        o.n_total, o.n_evaluable
    );
    let _ = writeln!(
        out,
        "NDI: {} ({})",
        o.n_ndi,
        format_pct(o.ndi_prevalence)
    );
    for d in &o.domains {
        let _ = writeln!(
            out,
            "  {} impairment: {}/{} ({})",
            d.domain.name(),
            d.n_impaired,
            d.n_evaluable,
            format_pct(d.prevalence)
        );
    }
    out.push('\n');
}

fn render_discrimination(out: &mut String, composites: &[CompositeDiscrimination]) {
    out.push_str("2. Discrimination\n");
    for c in composites {
        let _ = writeln!(
            out,
            "{} (n = {}, NDI = {})",
            c.composite.label(),
            c.n,
            c.n_ndi
        );
        let Some(eval) = &c.evaluation else {
            let _ = writeln!(
                out,
                "  not evaluable: {}",
                c.not_evaluable.as_deref().unwrap_or("unknown reason")
            );
            continue;
        };
        let _ = writeln!(
            out,
            "  AUC: {}",
            format_estimate_ci(eval.auc, ci_bounds(eval.ci.as_ref()), 3)
        );
        let _ = writeln!(out, "  Direction: {}", eval.direction.name());
        match &eval.cutpoint {
            Some(cut) => {
                let _ = writeln!(
                    out,
                    "  Optimal cutpoint (Youden): {} (J = {})",
                    cut.rule(),
                    format_fixed(cut.youden_j, 3)
                );
                let _ = writeln!(
                    out,
                    "  Sensitivity {}, specificity {}, PPV {}, NPV {}, accuracy {}",
                    format_fixed(cut.sensitivity, 3),
                    format_fixed(cut.specificity, 3),
                    format_opt(cut.ppv, 3),
                    format_opt(cut.npv, 3),
                    format_fixed(cut.accuracy, 3)
                );
                let _ = writeln!(
                    out,
                    "  TP {}, FP {}, TN {}, FN {}",
                    cut.tp, cut.fp, cut.tn, cut.fn_
                );
            }
            None => out.push_str("  Optimal cutpoint: not available (constant score)\n"),
        }
    }
    out.push('\n');
}

fn render_comparison(out: &mut String, data: &SummaryData<'_>) {
    let cmp = data.comparison;
    out.push_str("3. AUC comparison\n");
    match &cmp.result {
        Some(diff) => {
            let _ = writeln!(
                out,
                "{} - {} (paired, n = {}): {}",
                cmp.first.name(),
                cmp.second.name(),
                diff.n,
                format_estimate_ci(diff.difference, ci_bounds(diff.ci.as_ref()), 3)
            );
            let _ = writeln!(
                out,
                "Bootstrap z = {}, p = {}",
                format_opt(diff.z, 3),
                format_p(diff.p_value)
            );
        }
        None => {
            let _ = writeln!(
                out,
                "Not evaluable: {}",
                cmp.not_evaluable.as_deref().unwrap_or("unknown reason")
            );
        }
    }
    out.push('\n');
}

fn render_tertiles(out: &mut String, tertiles: &[TertileAnalysis], unadjusted: bool) {
    out.push_str("4. Risk tertiles\n");
    if !unadjusted {
        out.push_str("Odds ratios adjusted for the listed covariates.\n");
    }
    for t in tertiles {
        let _ = writeln!(
            out,
            "{} (n = {}, NDI = {})",
            t.composite.label(),
            t.n,
            t.n_ndi
        );
        for row in &t.rows {
            let or_text = if row.reference {
                "reference".to_string()
            } else {
                match &row.odds_ratio {
                    Some(or) => format!(
                        "OR {}, p = {}",
                        format_estimate_ci(or.odds_ratio, Some((or.ci_lower, or.ci_upper)), 2),
                        format_p(Some(or.p_value))
                    ),
                    None => "OR NA".to_string(),
                }
            };
            let _ = writeln!(
                out,
                "  {:<14} NDI {}/{} ({}); {}",
                row.tertile.label(),
                row.n_ndi,
                row.n,
                format_pct(row.ndi_prevalence),
                or_text
            );
        }
        for cov in &t.covariates {
            let _ = writeln!(
                out,
                "  covariate {}: OR {}, p = {}",
                cov.term,
                format_estimate_ci(cov.odds_ratio, Some((cov.ci_lower, cov.ci_upper)), 2),
                format_p(Some(cov.p_value))
            );
        }
    }
    out.push('\n');
}
