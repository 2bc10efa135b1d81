// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Surrogate Interfaces
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Trait seam between the retention models and the regression backend.

use std::fmt::Debug;

use divh_types::error::RetentionResult;
use ndarray::{Array1, Array2};

/// Predictive mean and standard deviation at one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub mean: f64,
    pub stdev: f64,
}

/// A trained regression model.
pub trait Surrogate: Debug + Send + Sync {
    /// Input dimension expected by [`Surrogate::predict`].
    fn n_inputs(&self) -> usize;

    fn predict(&self, point: &[f64]) -> RetentionResult<Prediction>;
}

/// Something that turns training data into a [`Surrogate`].
///
/// `x` has one row per sample and one column per input; `y` holds the
/// matching targets.
pub trait RegressionMethod: Debug + Send + Sync {
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> RetentionResult<Box<dyn Surrogate>>;
}
