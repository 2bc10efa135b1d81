// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Gaussian Process Regression
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Gaussian-process regression with maximum-likelihood hyperparameters.
//!
//! The prior has a constant mean and a stationary kernel. Hyperparameters
//! `[mean, ln a, (ln alpha), ln l_1 .. ln l_d]` minimise the negative log
//! marginal likelihood with a bounded simplex from several starts: the
//! centre of the bounds plus seeded uniform draws. Starts run on the rayon
//! pool; the lowest optimum wins, ties going to the earlier start.

use divh_math::linalg::{cholesky, cholesky_solve, log_det_from_cholesky, solve_lower};
use divh_math::optimize::{minimize_bounded, SimplexConfig};
use divh_types::config::{GpConfig, KernelKind};
use divh_types::error::{RetentionError, RetentionResult};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::kernel::Kernel;
use crate::surrogate::{Prediction, RegressionMethod, Surrogate};

const LN_ALPHA_BOUNDS: (f64, f64) = (-2.0, 6.0);
/// Floor on the relative diagonal jitter so the covariance stays factorable.
const MIN_RELATIVE_JITTER: f64 = 1e-12;

/// Fitted GP regressor.
#[derive(Debug, Clone)]
pub struct GpModel {
    kernel: Kernel,
    prior_mean: f64,
    x_train: Array2<f64>,
    chol: Array2<f64>,
    weights: Array1<f64>,
    nlml: f64,
}

impl GpModel {
    /// Checked fit API returning structured errors on invalid data.
    pub fn try_fit(x: &Array2<f64>, y: &Array1<f64>, config: &GpConfig) -> RetentionResult<Self> {
        validate_training_data(x, y)?;
        if config.n_starts == 0 {
            return Err(RetentionError::ConfigError(
                "GP fit requires at least one optimiser start".to_string(),
            ));
        }

        let bounds = hyperparameter_bounds(x, y, config.kernel);
        let starts = initial_points(&bounds, config.n_starts, config.seed);
        let simplex = SimplexConfig {
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            ..Default::default()
        };

        let runs = starts
            .par_iter()
            .map(|x0| {
                minimize_bounded(
                    |theta| negative_log_marginal_likelihood(x, y, theta, config),
                    x0,
                    &bounds,
                    &simplex,
                )
            })
            .collect::<RetentionResult<Vec<_>>>()?;

        // Iterator::min_by keeps the first of equal elements.
        let (best_start, best) = runs
            .into_iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.value.total_cmp(&b.value))
            .ok_or_else(|| RetentionError::LinAlg("GP optimiser produced no result".to_string()))?;
        if !best.value.is_finite() {
            return Err(RetentionError::LinAlg(
                "GP covariance is singular for every hyperparameter start".to_string(),
            ));
        }
        debug!(
            start = best_start,
            iterations = best.iterations,
            converged = best.converged,
            "Selected GP optimiser start"
        );

        Self::with_hyperparameters(x, y, &best.x, config)
    }

    /// Condition the prior on `(x, y)` at fixed hyperparameters.
    pub fn with_hyperparameters(
        x: &Array2<f64>,
        y: &Array1<f64>,
        theta: &[f64],
        config: &GpConfig,
    ) -> RetentionResult<Self> {
        validate_training_data(x, y)?;
        let expected = 1 + Kernel::n_params(config.kernel, x.ncols());
        if theta.len() != expected {
            return Err(RetentionError::ShapeMismatch {
                name: "gp.hyperparameters".to_string(),
                expected,
                got: theta.len(),
            });
        }

        let prior_mean = theta[0];
        let kernel = Kernel::from_log_params(config.kernel, &theta[1..]);
        let k = kernel.covariance(x, jitter(&kernel, config.nugget));
        let chol = cholesky(&k)?;
        let residual = y.mapv(|v| v - prior_mean);
        let weights = cholesky_solve(&chol, &residual);
        let nlml = nlml_from_factor(&chol, &residual, &weights);

        Ok(GpModel {
            kernel,
            prior_mean,
            x_train: x.clone(),
            chol,
            weights,
            nlml,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn prior_mean(&self) -> f64 {
        self.prior_mean
    }

    pub fn negative_log_marginal_likelihood(&self) -> f64 {
        self.nlml
    }

    pub fn n_samples(&self) -> usize {
        self.x_train.nrows()
    }

    fn predict_view(&self, point: ArrayView1<f64>) -> Prediction {
        let k_star = self.kernel.cross(&self.x_train, point);
        let mean = self.prior_mean + k_star.dot(&self.weights);
        let v = solve_lower(&self.chol, &k_star);
        let var = self.kernel.variance() - v.dot(&v);
        Prediction {
            mean,
            stdev: var.max(0.0).sqrt(),
        }
    }
}

impl Surrogate for GpModel {
    fn n_inputs(&self) -> usize {
        self.x_train.ncols()
    }

    fn predict(&self, point: &[f64]) -> RetentionResult<Prediction> {
        if point.len() != self.n_inputs() {
            return Err(RetentionError::ShapeMismatch {
                name: "gp.query".to_string(),
                expected: self.n_inputs(),
                got: point.len(),
            });
        }
        if !point.iter().all(|v| v.is_finite()) {
            return Err(RetentionError::DomainError(format!(
                "GP query must be finite, got {point:?}"
            )));
        }
        Ok(self.predict_view(ArrayView1::from(point)))
    }
}

/// Default [`RegressionMethod`]: maximum-likelihood GP regression.
#[derive(Debug, Clone, Default)]
pub struct GpRegression {
    config: GpConfig,
}

impl GpRegression {
    pub fn new(config: GpConfig) -> Self {
        GpRegression { config }
    }

    pub fn config(&self) -> &GpConfig {
        &self.config
    }

    /// Fit and keep the concrete model type.
    #[instrument(skip_all, fields(samples = x.nrows(), dims = x.ncols()))]
    pub fn fit_model(&self, x: &Array2<f64>, y: &Array1<f64>) -> RetentionResult<GpModel> {
        let model = GpModel::try_fit(x, y, &self.config)?;
        info!(
            kernel = ?self.config.kernel,
            amplitude = model.kernel.amplitude,
            alpha = model.kernel.alpha,
            length_scales = ?model.kernel.length_scales,
            nlml = model.nlml,
            "GP fit complete"
        );
        Ok(model)
    }
}

impl RegressionMethod for GpRegression {
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> RetentionResult<Box<dyn Surrogate>> {
        Ok(Box::new(self.fit_model(x, y)?))
    }
}

fn validate_training_data(x: &Array2<f64>, y: &Array1<f64>) -> RetentionResult<()> {
    if x.nrows() != y.len() {
        return Err(RetentionError::ShapeMismatch {
            name: "gp.targets".to_string(),
            expected: x.nrows(),
            got: y.len(),
        });
    }
    if x.nrows() < 2 {
        return Err(RetentionError::ConfigError(format!(
            "GP fit requires at least 2 samples, got {}",
            x.nrows()
        )));
    }
    if x.ncols() == 0 {
        return Err(RetentionError::ConfigError(
            "GP fit requires at least one input dimension".to_string(),
        ));
    }
    if !x.iter().all(|v| v.is_finite()) || !y.iter().all(|v| v.is_finite()) {
        return Err(RetentionError::ConfigError(
            "GP fit received non-finite samples or targets".to_string(),
        ));
    }
    Ok(())
}

fn jitter(kernel: &Kernel, nugget: f64) -> f64 {
    kernel.variance() * nugget.max(MIN_RELATIVE_JITTER)
}

fn nlml_from_factor(chol: &Array2<f64>, residual: &Array1<f64>, weights: &Array1<f64>) -> f64 {
    let n = residual.len() as f64;
    0.5 * residual.dot(weights)
        + 0.5 * log_det_from_cholesky(chol)
        + 0.5 * n * (2.0 * std::f64::consts::PI).ln()
}

/// Objective for the optimiser; `+inf` where the covariance is singular.
fn negative_log_marginal_likelihood(
    x: &Array2<f64>,
    y: &Array1<f64>,
    theta: &[f64],
    config: &GpConfig,
) -> f64 {
    let kernel = Kernel::from_log_params(config.kernel, &theta[1..]);
    let k = kernel.covariance(x, jitter(&kernel, config.nugget));
    let Ok(chol) = cholesky(&k) else {
        return f64::INFINITY;
    };
    let residual = y.mapv(|v| v - theta[0]);
    let weights = cholesky_solve(&chol, &residual);
    nlml_from_factor(&chol, &residual, &weights)
}

/// Smallest positive gap between sorted values of one input column.
fn min_spacing(column: ArrayView1<f64>) -> Option<f64> {
    let mut v: Vec<f64> = column.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v.windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .min_by(|a, b| a.total_cmp(b))
}

/// Box for `[mean, ln a, (ln alpha), ln l_1 .. ln l_d]` derived from the data.
fn hyperparameter_bounds(x: &Array2<f64>, y: &Array1<f64>, kind: KernelKind) -> Vec<(f64, f64)> {
    let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_range = (y_max - y_min).max(1e-6);
    let n = y.len() as f64;
    let y_mean = y.sum() / n;
    let y_std = (y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / n)
        .sqrt()
        .max(1e-6);

    let mut bounds = vec![
        (y_min - y_range, y_max + y_range),
        ((y_std * 1e-2).ln(), (y_std * 1e2).ln()),
    ];
    if kind == KernelKind::RationalQuadratic {
        bounds.push(LN_ALPHA_BOUNDS);
    }
    for col in x.columns() {
        let lo = col.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = if hi > lo { hi - lo } else { 1.0 };
        let spacing = min_spacing(col).unwrap_or(range * 1e-3);
        let upper = (10.0 * range).ln();
        let lower = (0.5 * spacing).ln().min(upper - 1.0);
        bounds.push((lower, upper));
    }
    bounds
}

fn initial_points(bounds: &[(f64, f64)], n_starts: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut starts = Vec::with_capacity(n_starts);
    starts.push(bounds.iter().map(|(lo, hi)| 0.5 * (lo + hi)).collect());
    while starts.len() < n_starts {
        starts.push(
            bounds
                .iter()
                .map(|(lo, hi)| lo + (hi - lo) * rng.gen::<f64>())
                .collect(),
        );
    }
    starts
}
