//! Least squares trend line.
//!
//! The scatter plot overlays the ordinary least squares line
//!
//! ```text
//! minimize Σ (y_i - (a + b·x_i))^2
//! ```
//!
//! Market values are in the 1e12 range while faith scores sit in [0, 100], so
//! x is standardized before solving and the coefficients are mapped back.
//! The solve goes through SVD, which copes with tall design matrices.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::math::{mean, sample_std};

/// `y = intercept + slope · x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub intercept: f64,
    pub slope: f64,
}

impl TrendLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y ≈ a + b·x`. `None` for fewer than two points or constant x.
pub fn fit_trend_line(x: &[f64], y: &[f64]) -> Option<TrendLine> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let sx = sample_std(x)?;
    if !(sx.is_finite() && sx > 0.0) {
        return None;
    }

    let n = x.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = (xi - mx) / sx;
    }
    let beta = solve_least_squares(&design, &DVector::from_column_slice(y))?;

    let slope = beta[1] / sx;
    Some(TrendLine {
        intercept: beta[0] - slope * mx,
        slope,
    })
}
