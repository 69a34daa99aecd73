use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

use crate::report::ReportError;
use crate::stats::roc::RocCurve;

const PALETTE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(214, 39, 40),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
];

fn plot_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Plot(err.to_string())
}

pub struct RocSeries<'a> {
    pub label: String,
    pub curve: &'a RocCurve,
}

pub struct ForestEntry {
    pub label: String,
    pub group: usize,
    pub odds_ratio: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

pub fn render_roc_svg(path: &Path, series: &[RocSeries<'_>]) -> Result<(), ReportError> {
    let root = SVGBackend::new(path, (640, 640)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("ROC curves for NDI", ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("1 - Specificity")
        .y_desc("Sensitivity")
        .x_labels(6)
        .y_labels(6)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            vec![(0.0, 0.0), (1.0, 1.0)],
            BLACK.mix(0.35).stroke_width(1),
        ))
        .map_err(plot_err)?;

    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<(f64, f64)> = s.curve.points.iter().map(|p| (p.fpr, p.tpr)).collect();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(plot_err)?
            .label(s.label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    Ok(())
}

/// Log-scale x range covering every interval and the null value 1.
fn forest_range(entries: &[ForestEntry]) -> (f64, f64) {
    let mut lo = 1.0f64;
    let mut hi = 1.0f64;
    for e in entries {
        for v in [e.ci_lower, e.odds_ratio, e.ci_upper] {
            if v.is_finite() && v > 0.0 {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    (lo / 1.5, hi * 1.5)
}

/// Horizontal forest plot, one row per entry from top to bottom.
pub fn render_forest_svg(path: &Path, entries: &[ForestEntry]) -> Result<(), ReportError> {
    let root = SVGBackend::new(path, (720, 120 + 48 * entries.len().max(1) as u32))
        .into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let n_rows = entries.len().max(1);
    let (x_lo, x_hi) = forest_range(entries);
    let labels: Vec<String> = entries.iter().rev().map(|e| e.label.clone()).collect();
    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption("NDI odds ratios by risk tertile (vs Low Risk)", ("sans-serif", 20))
        .margin(16)
        .x_label_area_size(44)
        .y_label_area_size(220)
        .build_cartesian_2d((x_lo..x_hi).log_scale(), (0..n_rows).into_segmented())
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Odds ratio (log scale)")
        .y_labels(n_rows)
        .y_label_formatter(&label_of)
        .x_label_formatter(&|v| format!("{v:.2}"))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(1.0, SegmentValue::Exact(0)), (1.0, SegmentValue::Last)],
            BLACK.mix(0.5).stroke_width(1),
        )))
        .map_err(plot_err)?;

    for (row, entry) in entries.iter().rev().enumerate() {
        if !(entry.odds_ratio.is_finite() && entry.ci_lower > 0.0 && entry.ci_upper.is_finite()) {
            continue;
        }
        let color = PALETTE[entry.group % PALETTE.len()];
        let y = SegmentValue::CenterOf(row);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(entry.ci_lower, y.clone()), (entry.ci_upper, y.clone())],
                color.stroke_width(2),
            )))
            .map_err(plot_err)?;
        chart
            .draw_series(std::iter::once(Circle::new(
                (entry.odds_ratio, y),
                5,
                color.filled(),
            )))
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/plots.rs"]
mod tests;
