use super::*;
use crate::model::cohort::Participant;
use crate::model::thresholds::NdiDefinition;
use crate::pipeline::fixtures::{cohort_of, participant, synthetic_cohort};
use crate::pipeline::stage1_outcomes::run_stage1;
use approx::assert_abs_diff_eq;

fn row(id: &str, domains: [Option<f64>; 3], scores: [Option<f64>; 2]) -> Participant {
    participant(id, domains, scores, [None, None])
}

fn params(n_boot: usize) -> Stage2Params {
    Stage2Params {
        direction: Direction::Auto,
        n_boot,
        conf_level: 0.95,
        seed: 42,
    }
}

#[test]
fn test_stage2_synthetic_cohort() {
    let cohort = synthetic_cohort();
    let outcomes = run_stage1(&cohort, &NdiDefinition::default_v1());
    let out = run_stage2(&cohort, &outcomes, &params(200));

    assert_eq!(out.composites.len(), 2);
    let sup = &out.composites[0];
    assert_eq!(sup.composite, CompositeKind::Supervised);
    assert_eq!((sup.n, sup.n_ndi), (90, 45));
    let eval = sup.evaluation.as_ref().unwrap();
    assert_eq!(eval.direction, Direction::HigherIsRisk);
    assert_abs_diff_eq!(eval.auc, 0.787_654_320_987_654_3, epsilon = 1e-9);
    let ci = eval.ci.as_ref().unwrap();
    assert!(ci.lower < eval.auc && eval.auc < ci.upper);
    let cut = eval.cutpoint.as_ref().unwrap();
    assert!(cut.youden_j > 0.0);
    assert_eq!(cut.tp + cut.fn_, 45);
    assert_eq!(cut.tn + cut.fp, 45);

    let unsup = out.composites[1].evaluation.as_ref().unwrap();
    assert_abs_diff_eq!(unsup.auc, 0.731_851_851_851_851_8, epsilon = 1e-9);

    let diff = out.comparison.result.as_ref().unwrap();
    assert_abs_diff_eq!(diff.difference, eval.auc - unsup.auc, epsilon = 1e-12);
    assert_eq!(diff.n, 90);
}

#[test]
fn test_stage2_is_reproducible() {
    let cohort = synthetic_cohort();
    let outcomes = run_stage1(&cohort, &NdiDefinition::default_v1());
    let a = run_stage2(&cohort, &outcomes, &params(100));
    let b = run_stage2(&cohort, &outcomes, &params(100));
    for (x, y) in a.composites.iter().zip(&b.composites) {
        assert_eq!(
            x.evaluation.as_ref().unwrap().ci,
            y.evaluation.as_ref().unwrap().ci
        );
    }
    assert_eq!(a.comparison.result, b.comparison.result);
}

#[test]
fn test_stage2_excludes_incomplete_rows() {
    let cohort = cohort_of(vec![
        row("a", [Some(70.0), Some(90.0), Some(90.0)], [Some(0.9), None]),
        row("b", [Some(100.0), Some(90.0), Some(90.0)], [Some(0.1), Some(0.2)]),
        row("c", [Some(100.0), None, Some(90.0)], [Some(0.5), Some(0.5)]),
        row("d", [Some(75.0), Some(90.0), Some(90.0)], [None, Some(0.7)]),
    ]);
    let outcomes = run_stage1(&cohort, &NdiDefinition::default_v1());
    let (scores, labels) = complete_cases(&cohort, &outcomes, CompositeKind::Supervised);
    assert_eq!(scores, vec![0.9, 0.1]);
    assert_eq!(labels, vec![true, false]);
}

#[test]
fn test_stage2_not_evaluable_without_cases() {
    let cohort = cohort_of(vec![
        row("a", [Some(100.0), Some(90.0), Some(90.0)], [Some(0.9), Some(0.1)]),
        row("b", [Some(100.0), Some(95.0), Some(90.0)], [Some(0.1), Some(0.2)]),
    ]);
    let outcomes = run_stage1(&cohort, &NdiDefinition::default_v1());
    let out = run_stage2(&cohort, &outcomes, &params(10));
    for c in &out.composites {
        assert!(c.evaluation.is_none());
        assert_eq!(c.not_evaluable.as_deref(), Some("no positive (NDI) observations"));
    }
    assert!(out.comparison.result.is_none());
    assert!(out.comparison.not_evaluable.is_some());
}
