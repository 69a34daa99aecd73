use super::*;
use approx::assert_abs_diff_eq;

#[test]
fn test_cdf_reference_values() {
    assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-7);
    assert_abs_diff_eq!(normal_cdf(1.959964), 0.975, epsilon = 1e-6);
    assert_abs_diff_eq!(normal_cdf(-1.0), 0.158_655_25, epsilon = 1e-6);
    assert_abs_diff_eq!(normal_cdf(3.0), 0.998_650_10, epsilon = 1e-6);
}

#[test]
fn test_quantile_reference_values() {
    assert_abs_diff_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(normal_quantile(0.975), 1.959_963_985, epsilon = 1e-6);
    assert_abs_diff_eq!(normal_quantile(0.01), -2.326_347_874, epsilon = 1e-6);
    assert_abs_diff_eq!(normal_quantile(0.995), 2.575_829_304, epsilon = 1e-6);
    assert!(normal_quantile(1.5).is_nan());
    assert_eq!(normal_quantile(0.0), f64::NEG_INFINITY);
}

#[test]
fn test_quantile_inverts_cdf() {
    for &p in &[0.001, 0.02, 0.3, 0.7, 0.98, 0.999] {
        assert_abs_diff_eq!(normal_cdf(normal_quantile(p)), p, epsilon = 1e-6);
    }
}

#[test]
fn test_two_sided_p() {
    assert_abs_diff_eq!(two_sided_p(1.959_964), 0.05, epsilon = 1e-6);
    assert_abs_diff_eq!(two_sided_p(-1.959_964), 0.05, epsilon = 1e-6);
    assert_abs_diff_eq!(two_sided_p(0.0), 1.0, epsilon = 1e-7);
    assert_eq!(two_sided_p(f64::INFINITY), 0.0);
}

#[test]
fn test_critical_value() {
    assert_abs_diff_eq!(critical_value(0.95), 1.959_963_985, epsilon = 1e-6);
    assert_abs_diff_eq!(critical_value(0.90), 1.644_853_627, epsilon = 1e-6);
}
