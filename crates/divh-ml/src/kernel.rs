// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Covariance Kernels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Stationary covariance kernels with per-dimension length scales.

use divh_types::config::KernelKind;
use ndarray::{Array1, Array2, ArrayView1};

/// Concrete kernel hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    pub kind: KernelKind,
    /// Signal amplitude `a`; the kernel variance is `a^2`.
    pub amplitude: f64,
    /// Rational-quadratic scale mixture. Ignored by the squared exponential.
    pub alpha: f64,
    pub length_scales: Vec<f64>,
}

impl Kernel {
    /// Number of free log-space hyperparameters (amplitude, alpha?, lengths).
    pub fn n_params(kind: KernelKind, dims: usize) -> usize {
        match kind {
            KernelKind::RationalQuadratic => 2 + dims,
            KernelKind::SquaredExponential => 1 + dims,
        }
    }

    /// Build from `[ln a, (ln alpha), ln l_1 .. ln l_d]`.
    pub fn from_log_params(kind: KernelKind, theta: &[f64]) -> Self {
        let amplitude = theta[0].exp();
        let (alpha, lengths) = match kind {
            KernelKind::RationalQuadratic => (theta[1].exp(), &theta[2..]),
            KernelKind::SquaredExponential => (1.0, &theta[1..]),
        };
        Kernel {
            kind,
            amplitude,
            alpha,
            length_scales: lengths.iter().map(|v| v.exp()).collect(),
        }
    }

    pub fn variance(&self) -> f64 {
        self.amplitude * self.amplitude
    }

    /// Squared scaled distance `sum_i (dx_i / l_i)^2`.
    fn scaled_sq_dist(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .zip(self.length_scales.iter())
            .map(|((x, y), l)| {
                let d = (x - y) / l;
                d * d
            })
            .sum()
    }

    pub fn eval(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        let r2 = self.scaled_sq_dist(a, b);
        let shape = match self.kind {
            KernelKind::RationalQuadratic => (1.0 + r2 / (2.0 * self.alpha)).powf(-self.alpha),
            KernelKind::SquaredExponential => (-0.5 * r2).exp(),
        };
        self.variance() * shape
    }

    /// Symmetric training covariance with `jitter` added on the diagonal.
    pub fn covariance(&self, x: &Array2<f64>, jitter: f64) -> Array2<f64> {
        let n = x.nrows();
        let mut k = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            k[[i, i]] = self.variance() + jitter;
            for j in 0..i {
                let v = self.eval(x.row(i), x.row(j));
                k[[i, j]] = v;
                k[[j, i]] = v;
            }
        }
        k
    }

    /// Cross-covariance between every training row and `point`.
    pub fn cross(&self, x: &Array2<f64>, point: ArrayView1<f64>) -> Array1<f64> {
        Array1::from_shape_fn(x.nrows(), |i| self.eval(x.row(i), point))
    }
}
