// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Linear Algebra
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear algebra utilities.
//!
//! Cholesky factorisation and triangular solves for symmetric positive
//! definite covariance matrices.

use divh_types::error::{RetentionError, RetentionResult};
use ndarray::{Array1, Array2};

/// Lower-triangular Cholesky factor `L` with `A = L L^T`.
///
/// Fails when `A` is not square or a pivot is not strictly positive,
/// i.e. `A` is not numerically positive definite.
pub fn cholesky(a: &Array2<f64>) -> RetentionResult<Array2<f64>> {
    let (n, m) = a.dim();
    if n != m {
        return Err(RetentionError::LinAlg(format!(
            "Cholesky requires a square matrix, got {n}x{m}"
        )));
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut s = 0.0;
        for k in 0..j {
            s += l[[j, k]] * l[[j, k]];
        }
        let pivot = a[[j, j]] - s;
        if !pivot.is_finite() || pivot <= 0.0 {
            return Err(RetentionError::LinAlg(format!(
                "Matrix not positive definite: pivot {j} = {pivot:e}"
            )));
        }
        l[[j, j]] = pivot.sqrt();

        for i in (j + 1)..n {
            let mut s = 0.0;
            for k in 0..j {
                s += l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = (a[[i, j]] - s) / l[[j, j]];
        }
    }
    Ok(l)
}

/// Forward solve `L y = b`.
pub fn solve_lower(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut s = 0.0;
        for k in 0..i {
            s += l[[i, k]] * y[k];
        }
        y[i] = (b[i] - s) / l[[i, i]];
    }
    y
}

/// Back solve `L^T x = y`.
pub fn solve_lower_transposed(l: &Array2<f64>, y: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut s = 0.0;
        for k in (i + 1)..n {
            s += l[[k, i]] * x[k];
        }
        x[i] = (y[i] - s) / l[[i, i]];
    }
    x
}

/// Solve `A x = b` given the Cholesky factor of `A`.
pub fn cholesky_solve(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let y = solve_lower(l, b);
    solve_lower_transposed(l, &y)
}

/// `ln det A` from its Cholesky factor.
pub fn log_det_from_cholesky(l: &Array2<f64>) -> f64 {
    2.0 * l.diag().iter().map(|v| v.ln()).sum::<f64>()
}
