use super::*;
use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2, array};

/// Rows per tertile as (n, events); returns design with intercept + two dummies.
fn tertile_design(groups: &[(usize, usize); 3]) -> (Array2<f64>, Array1<f64>) {
    let n: usize = groups.iter().map(|g| g.0).sum();
    let mut x = Array2::<f64>::zeros((n, 3));
    let mut y = Array1::<f64>::zeros(n);
    let mut row = 0;
    for (level, &(size, events)) in groups.iter().enumerate() {
        for k in 0..size {
            x[[row, 0]] = 1.0;
            if level > 0 {
                x[[row, level]] = 1.0;
            }
            y[row] = if k < events { 1.0 } else { 0.0 };
            row += 1;
        }
    }
    (x, y)
}

fn terms() -> Vec<String> {
    vec![
        "(Intercept)".to_string(),
        "Moderate Risk".to_string(),
        "High Risk".to_string(),
    ]
}

#[test]
fn test_irls_matches_closed_form_odds_ratios() {
    let (x, y) = tertile_design(&[(40, 4), (30, 6), (30, 15)]);
    let fit = fit_logistic(x.view(), y.view(), &terms()).unwrap();
    assert!(fit.converged);
    assert!(fit.iterations < 25);

    assert_abs_diff_eq!(fit.coefficients[0], (4.0f64 / 36.0).ln(), epsilon = 1e-6);
    let ors = fit.odds_ratios(0.95);
    assert_eq!(ors.len(), 2);
    assert_eq!(ors[0].term, "Moderate Risk");
    assert_abs_diff_eq!(ors[0].odds_ratio, 2.25, epsilon = 1e-5);
    assert_abs_diff_eq!(ors[1].odds_ratio, 9.0, epsilon = 1e-5);

    let se_high = (1.0f64 / 15.0 + 1.0 / 15.0 + 1.0 / 4.0 + 1.0 / 36.0).sqrt();
    assert_abs_diff_eq!(ors[1].std_error, se_high, epsilon = 1e-5);
    let z = 1.959_963_985;
    assert_abs_diff_eq!(ors[1].ci_lower, (9.0f64.ln() - z * se_high).exp(), epsilon = 1e-3);
    assert_abs_diff_eq!(ors[1].ci_upper, (9.0f64.ln() + z * se_high).exp(), epsilon = 1e-2);
    assert!(ors[1].p_value < 0.01);
    assert!(ors[0].p_value > 0.05);
    assert!(fit.deviance < fit.null_deviance);
}

#[test]
fn test_irls_null_effect() {
    let (x, y) = tertile_design(&[(20, 5), (20, 5), (20, 5)]);
    let fit = fit_logistic(x.view(), y.view(), &terms()).unwrap();
    let ors = fit.odds_ratios(0.95);
    assert_abs_diff_eq!(ors[0].odds_ratio, 1.0, epsilon = 1e-8);
    assert_abs_diff_eq!(ors[1].odds_ratio, 1.0, epsilon = 1e-8);
    assert_abs_diff_eq!(ors[1].p_value, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.deviance, fit.null_deviance, epsilon = 1e-8);
}

#[test]
fn test_irls_singular_design() {
    let (mut x, y) = tertile_design(&[(20, 5), (20, 5), (20, 5)]);
    x.column_mut(2).fill(0.0);
    let err = fit_logistic(x.view(), y.view(), &terms()).unwrap_err();
    assert_eq!(err, StatsError::Singular);
}

#[test]
fn test_irls_input_checks() {
    let x = array![[1.0, 0.0], [1.0, 1.0]];
    let y = array![0.0, 1.0];
    let names = vec!["(Intercept)".to_string(), "x".to_string()];
    assert_eq!(
        fit_logistic(x.view(), y.view(), &names).unwrap_err(),
        StatsError::TooFewObservations { n: 2, p: 2 }
    );
    let y3 = array![0.0, 1.0, 1.0];
    assert_eq!(
        fit_logistic(x.view(), y3.view(), &names).unwrap_err(),
        StatsError::LengthMismatch(2, 3)
    );
}

#[test]
fn test_coefficients_follow_term_order() {
    let (x, y) = tertile_design(&[(40, 4), (30, 6), (30, 15)]);
    let fit = fit_logistic(x.view(), y.view(), &terms()).unwrap();
    assert_eq!(fit.terms, terms());
    assert_abs_diff_eq!(fit.coefficients[2], 9.0f64.ln(), epsilon = 1e-6);
    assert_abs_diff_eq!(fit.coefficients[0], (4.0f64 / 36.0).ln(), epsilon = 1e-6);
}

#[test]
fn test_spd_solve_and_inverse() {
    let a = array![[4.0, 2.0], [2.0, 3.0]];
    let inv = invert_spd(&a).unwrap();
    let prod = a.dot(&inv);
    assert_abs_diff_eq!(prod[[0, 0]], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(prod[[0, 1]], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(prod[[1, 1]], 1.0, epsilon = 1e-12);

    let llt = factorize_spd(&a).unwrap();
    let x = solve_spd(&llt, &array![8.0, 7.0]);
    assert_abs_diff_eq!(x[0], 1.25, epsilon = 1e-12);
    assert_abs_diff_eq!(x[1], 1.5, epsilon = 1e-12);

    assert_eq!(
        factorize_spd(&array![[1.0, 1.0], [1.0, 1.0]]).unwrap_err(),
        StatsError::Singular
    );
    assert_eq!(
        invert_spd(&array![[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 2.0]]).unwrap_err(),
        StatsError::Singular
    );
    assert_eq!(
        factorize_spd(&Array2::<f64>::zeros((2, 3))).unwrap_err(),
        StatsError::LengthMismatch(2, 3)
    );
}
