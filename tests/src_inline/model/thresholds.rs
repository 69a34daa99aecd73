use super::*;

#[test]
fn test_ndi_threshold_is_strict() {
    let def = NdiDefinition::default_v1();
    assert!(def.is_impaired(84.9));
    assert!(!def.is_impaired(85.0));
    assert!(!def.is_impaired(110.0));
}

#[test]
fn test_default_profile_validates() {
    let profile = AnalysisProfile::default_v1();
    assert!(profile.validate().is_ok());
    assert_eq!(profile.n_boot, 2000);
    assert_eq!(profile.direction, Direction::Auto);
}

#[test]
fn test_profile_rejects_bad_conf_level() {
    let mut profile = AnalysisProfile::default_v1();
    profile.conf_level = 1.0;
    assert!(profile.validate().is_err());
    profile.conf_level = 0.0;
    assert!(profile.validate().is_err());
}

#[test]
fn test_profile_rejects_duplicate_covariates() {
    let mut profile = AnalysisProfile::default_v1();
    profile.covariates = vec!["ga_weeks".to_string(), "ga_weeks".to_string()];
    let err = profile.validate().unwrap_err();
    assert!(err.contains("ga_weeks"));
}

#[test]
fn test_profile_rejects_non_finite_threshold() {
    let mut profile = AnalysisProfile::default_v1();
    profile.ndi.threshold = f64::NAN;
    assert!(profile.validate().is_err());
}
