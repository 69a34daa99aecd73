use super::*;
use approx::assert_abs_diff_eq;

fn mann_whitney_auc(cases: &[f64], controls: &[f64]) -> f64 {
    let mut sorted = controls.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    auc_from_sorted_controls(cases, &sorted)
}

fn classic() -> (Vec<f64>, Vec<bool>) {
    (vec![0.1, 0.4, 0.35, 0.8], vec![false, false, true, true])
}

#[test]
fn test_roc_curve_classic_example() {
    let (scores, labels) = classic();
    let curve = roc_curve(&scores, &labels, Direction::Auto).unwrap();
    assert_eq!(curve.direction, Direction::HigherIsRisk);
    assert_abs_diff_eq!(curve.auc, 0.75, epsilon = 1e-12);
    assert_eq!(curve.n_cases, 2);
    assert_eq!(curve.n_controls, 2);

    let fpr: Vec<f64> = curve.points.iter().map(|p| p.fpr).collect();
    let tpr: Vec<f64> = curve.points.iter().map(|p| p.tpr).collect();
    assert_eq!(fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
    assert_eq!(tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);

    assert_eq!(curve.points[0].threshold, f64::INFINITY);
    assert_abs_diff_eq!(curve.points[1].threshold, 0.6, epsilon = 1e-12);
    assert_abs_diff_eq!(curve.points[3].threshold, 0.225, epsilon = 1e-12);
    assert_eq!(curve.points[4].threshold, f64::NEG_INFINITY);
}

#[test]
fn test_auc_matches_mann_whitney_with_ties() {
    let scores = vec![1.0, 1.0, 2.0, 2.0, 3.0, 0.5, 2.0, 3.0];
    let labels = vec![false, true, false, true, true, false, false, true];
    let curve = roc_curve(&scores, &labels, Direction::HigherIsRisk).unwrap();
    let (cases, controls) = split_by_label(&scores, &labels);
    assert_abs_diff_eq!(curve.auc, mann_whitney_auc(&cases, &controls), epsilon = 1e-12);
}

#[test]
fn test_all_tied_scores_give_half() {
    let scores = vec![1.0, 1.0, 1.0, 1.0];
    let labels = vec![false, true, false, true];
    let curve = roc_curve(&scores, &labels, Direction::HigherIsRisk).unwrap();
    assert_abs_diff_eq!(curve.auc, 0.5, epsilon = 1e-12);
    assert_eq!(curve.points.len(), 2);
}

#[test]
fn test_lower_is_risk_direction() {
    let (scores, labels) = classic();
    let negated: Vec<f64> = scores.iter().map(|s| -s).collect();
    let curve = roc_curve(&negated, &labels, Direction::Auto).unwrap();
    assert_eq!(curve.direction, Direction::LowerIsRisk);
    assert_abs_diff_eq!(curve.auc, 0.75, epsilon = 1e-12);
    assert_eq!(curve.points[0].threshold, f64::NEG_INFINITY);
    assert_abs_diff_eq!(curve.points[1].threshold, -0.6, epsilon = 1e-12);
}

#[test]
fn test_forced_direction_flips_auc() {
    let (scores, labels) = classic();
    let curve = roc_curve(&scores, &labels, Direction::LowerIsRisk).unwrap();
    assert_abs_diff_eq!(curve.auc, 0.25, epsilon = 1e-12);
}

#[test]
fn test_roc_input_errors() {
    assert_eq!(
        roc_curve(&[], &[], Direction::Auto).unwrap_err(),
        StatsError::Empty
    );
    assert_eq!(
        roc_curve(&[1.0, 2.0], &[true], Direction::Auto).unwrap_err(),
        StatsError::LengthMismatch(2, 1)
    );
    assert_eq!(
        roc_curve(&[1.0, 2.0], &[false, false], Direction::Auto).unwrap_err(),
        StatsError::NoCases
    );
    assert_eq!(
        roc_curve(&[1.0, 2.0], &[true, true], Direction::Auto).unwrap_err(),
        StatsError::NoControls
    );
    assert_eq!(
        roc_curve(&[1.0, f64::NAN], &[true, false], Direction::Auto).unwrap_err(),
        StatsError::NonFinite(1)
    );
}

#[test]
fn test_mann_whitney_perfect_separation() {
    assert_eq!(mann_whitney_auc(&[3.0, 4.0], &[1.0, 2.0]), 1.0);
    assert_eq!(mann_whitney_auc(&[1.0, 2.0], &[3.0, 4.0]), 0.0);
    assert!(mann_whitney_auc(&[], &[1.0]).is_nan());
}
