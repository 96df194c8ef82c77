//! Ordinary least squares.
//!
//! Straight-line fits are solved as a small linear regression problem on the
//! design matrix `[x, 1]`:
//!
//! ```text
//! minimize Σ (y_i - (m x_i + b))^2
//! ```
//!
//! We solve with SVD so that a rank-deficient design (all x equal) still
//! yields the minimum-norm solution instead of failing.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. NaN when y is constant.
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Reciprocal of the slope.
    ///
    /// For a deflection-vs-torque fit (rad/Nm) this is the transmission
    /// stiffness in Nm/rad. A slope of exactly zero gives `+inf`.
    pub fn stiffness(&self) -> f64 {
        if self.slope == 0.0 {
            f64::INFINITY
        } else {
            1.0 / self.slope
        }
    }
}

/// Fit a straight line through `(x[i], y[i])`.
///
/// Returns `None` when there are fewer than two points. Every value must be
/// finite; callers reject NaN/inf rows before fitting.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    debug_assert_eq!(x.len(), y.len(), "x and y must have the same length");
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { x[i] } else { 1.0 });
    let target = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &target)?;
    let (slope, intercept) = (beta[0], beta[1]);

    Some(LinearFit {
        slope,
        intercept,
        r_squared: r_squared(x, y, slope, intercept),
        n,
    })
}

/// `1 - SS_res / SS_tot`, or NaN when `SS_tot` is zero.
fn r_squared(x: &[f64], y: &[f64], slope: f64, intercept: f64) -> f64 {
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - mean).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        f64::NAN
    }
}
