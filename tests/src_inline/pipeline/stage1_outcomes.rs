use super::*;
use crate::pipeline::fixtures::{cohort_of, participant, synthetic_cohort};

#[test]
fn test_ndi_three_valued_any() {
    assert_eq!(ndi_from_domains(&[Some(true), None, None]), Some(true));
    assert_eq!(ndi_from_domains(&[Some(false), None, Some(true)]), Some(true));
    assert_eq!(
        ndi_from_domains(&[Some(false), Some(false), Some(false)]),
        Some(false)
    );
    assert_eq!(ndi_from_domains(&[Some(false), None, Some(false)]), None);
    assert_eq!(ndi_from_domains(&[None, None, None]), None);
}

#[test]
fn test_stage1_counts_and_alignment() {
    let cohort = cohort_of(vec![
        participant("a", [Some(90.0), Some(85.0), Some(100.0)], [None, None], [None, None]),
        participant("b", [Some(84.0), None, Some(100.0)], [None, None], [None, None]),
        participant("c", [Some(90.0), None, Some(100.0)], [None, None], [None, None]),
        participant("d", [Some(70.0), Some(60.0), Some(100.0)], [None, None], [None, None]),
    ]);
    let out = run_stage1(&cohort, &NdiDefinition::default_v1());

    assert_eq!(out.ndi, vec![Some(false), Some(true), None, Some(true)]);
    assert_eq!(out.impaired[1], [Some(true), None, Some(false)]);

    let s = &out.summary;
    assert_eq!(s.n_total, 4);
    assert_eq!(s.n_evaluable, 3);
    assert_eq!(s.n_ndi, 2);
    assert_eq!(s.ndi_prevalence, Some(2.0 / 3.0));

    let cognitive = &s.domains[0];
    assert_eq!(cognitive.domain, Domain::Cognitive);
    assert_eq!((cognitive.n_evaluable, cognitive.n_impaired), (4, 2));
    let language = &s.domains[1];
    assert_eq!((language.n_evaluable, language.n_impaired), (2, 1));
    let motor = &s.domains[2];
    assert_eq!(motor.prevalence, Some(0.0));
}

#[test]
fn test_stage1_custom_threshold() {
    let cohort = cohort_of(vec![participant(
        "a",
        [Some(75.0), Some(80.0), Some(72.0)],
        [None, None],
        [None, None],
    )]);
    let strict = run_stage1(&cohort, &NdiDefinition { threshold: 70.0 });
    assert_eq!(strict.ndi, vec![Some(false)]);
    let default = run_stage1(&cohort, &NdiDefinition::default_v1());
    assert_eq!(default.ndi, vec![Some(true)]);
}

#[test]
fn test_stage1_synthetic_prevalence() {
    let cohort = synthetic_cohort();
    let out = run_stage1(&cohort, &NdiDefinition::default_v1());
    assert_eq!(out.summary.n_evaluable, 90);
    assert_eq!(out.summary.n_ndi, 45);
    assert_eq!(out.summary.domains[1].n_impaired, 0);
}

#[test]
fn test_fraction_empty_denominator() {
    assert_eq!(fraction(0, 0), None);
    assert_eq!(fraction(1, 4), Some(0.25));
}
