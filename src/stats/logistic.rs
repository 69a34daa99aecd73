use faer::linalg::solvers::{Llt, Solve};
use faer::{Mat, Side};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;

use crate::stats::StatsError;
use crate::stats::normal::{critical_value, two_sided_p};

const MAX_ITER: usize = 25;
const MAX_HALVING: usize = 20;
const DEVIANCE_TOL: f64 = 1e-8;
const MIN_WEIGHT: f64 = 1e-10;
const PROB_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Serialize)]
pub struct LogisticFit {
    pub terms: Vec<String>,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub deviance: f64,
    pub null_deviance: f64,
    pub n: usize,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsRatio {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub odds_ratio: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub p_value: f64,
}

fn inverse_logit(eta: f64) -> f64 {
    let e = eta.clamp(-700.0, 700.0);
    (1.0 / (1.0 + (-e).exp())).clamp(PROB_EPS, 1.0 - PROB_EPS)
}

/// Binomial deviance for 0/1 responses.
pub fn binomial_deviance(y: ArrayView1<f64>, mu: &Array1<f64>) -> f64 {
    let total: f64 = ndarray::Zip::from(y).and(mu).fold(0.0, |acc, &yi, &mi| {
        let m = mi.clamp(PROB_EPS, 1.0 - PROB_EPS);
        acc - (yi * m.ln() + (1.0 - yi) * (1.0 - m).ln())
    });
    2.0 * total
}

fn to_faer(a: &Array2<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Cholesky factor of a symmetric positive definite matrix. A pivot below
/// 1e-12 of the largest diagonal entry counts as singular.
pub fn factorize_spd(a: &Array2<f64>) -> Result<Llt<f64>, StatsError> {
    let p = a.nrows();
    if a.ncols() != p {
        return Err(StatsError::LengthMismatch(a.nrows(), a.ncols()));
    }
    let scale = a.diag().iter().fold(0.0f64, |m, v| m.max(v.abs())).max(1.0);
    let llt = Llt::new(to_faer(a).as_ref(), Side::Lower).map_err(|_| StatsError::Singular)?;
    let l = llt.L();
    if (0..p).any(|j| !(l[(j, j)] * l[(j, j)] > 1e-12 * scale)) {
        return Err(StatsError::Singular);
    }
    Ok(llt)
}

pub fn solve_spd(llt: &Llt<f64>, b: &Array1<f64>) -> Array1<f64> {
    let rhs = Mat::from_fn(b.len(), 1, |i, _| b[i]);
    let sol = llt.solve(rhs.as_ref());
    Array1::from_shape_fn(b.len(), |i| sol[(i, 0)])
}

pub fn invert_spd(a: &Array2<f64>) -> Result<Array2<f64>, StatsError> {
    let llt = factorize_spd(a)?;
    let p = a.nrows();
    let inv = llt.solve(Mat::<f64>::identity(p, p).as_ref());
    Ok(Array2::from_shape_fn((p, p), |(i, j)| inv[(i, j)]))
}

/// Xᵀ W X for diagonal weights `w`.
fn weighted_crossprod(x: ArrayView2<f64>, w: &Array1<f64>) -> Array2<f64> {
    let xw = &x * &w.view().insert_axis(Axis(1));
    x.t().dot(&xw)
}

fn fitted(x: ArrayView2<f64>, beta: &Array1<f64>) -> Array1<f64> {
    x.dot(beta).mapv(inverse_logit)
}

/// Maximum-likelihood logistic regression by iteratively reweighted least
/// squares. `x` must carry its own intercept column.
pub fn fit_logistic(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    terms: &[String],
) -> Result<LogisticFit, StatsError> {
    let (n, p) = x.dim();
    if y.len() != n {
        return Err(StatsError::LengthMismatch(n, y.len()));
    }
    if terms.len() != p {
        return Err(StatsError::LengthMismatch(p, terms.len()));
    }
    if n == 0 {
        return Err(StatsError::Empty);
    }
    if n <= p {
        return Err(StatsError::TooFewObservations { n, p });
    }

    let ybar = y.sum() / n as f64;
    let null_deviance = binomial_deviance(y, &Array1::from_elem(n, ybar));

    let mut beta = Array1::<f64>::zeros(p);
    let mut mu = fitted(x, &beta);
    let mut deviance = binomial_deviance(y, &mu);
    let mut converged = false;
    let mut iterations = 0usize;

    for iter in 1..=MAX_ITER {
        iterations = iter;
        let w = mu.mapv(|m| (m * (1.0 - m)).max(MIN_WEIGHT));
        let info = weighted_crossprod(x, &w);
        let score = x.t().dot(&(&y - &mu));
        let llt = factorize_spd(&info)?;
        let mut step = solve_spd(&llt, &score);

        let mut candidate = &beta + &step;
        let mut candidate_mu = fitted(x, &candidate);
        let mut candidate_dev = binomial_deviance(y, &candidate_mu);
        let mut halvings = 0usize;
        while !(candidate_dev <= deviance + DEVIANCE_TOL) && halvings < MAX_HALVING {
            step.mapv_inplace(|s| s * 0.5);
            candidate = &beta + &step;
            candidate_mu = fitted(x, &candidate);
            candidate_dev = binomial_deviance(y, &candidate_mu);
            halvings += 1;
        }

        let change = (deviance - candidate_dev).abs() / (candidate_dev.abs() + 0.1);
        beta = candidate;
        mu = candidate_mu;
        deviance = candidate_dev;
        if change < DEVIANCE_TOL {
            converged = true;
            break;
        }
    }

    let w = mu.mapv(|m| (m * (1.0 - m)).max(MIN_WEIGHT));
    let cov = invert_spd(&weighted_crossprod(x, &w))?;
    let std_errors = cov.diag().iter().map(|v| v.max(0.0).sqrt()).collect();

    Ok(LogisticFit {
        terms: terms.to_vec(),
        coefficients: beta.to_vec(),
        std_errors,
        deviance,
        null_deviance,
        n,
        iterations,
        converged,
    })
}

impl LogisticFit {
    /// Wald odds ratios for every term except the intercept (column 0).
    pub fn odds_ratios(&self, conf_level: f64) -> Vec<OddsRatio> {
        let z = critical_value(conf_level);
        self.terms
            .iter()
            .zip(self.coefficients.iter().zip(&self.std_errors))
            .skip(1)
            .map(|(term, (&b, &se))| OddsRatio {
                term: term.clone(),
                estimate: b,
                std_error: se,
                odds_ratio: b.exp(),
                ci_lower: (b - z * se).exp(),
                ci_upper: (b + z * se).exp(),
                p_value: two_sided_p(b / se),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/logistic.rs"]
mod tests;
