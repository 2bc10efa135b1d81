// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Regression Models
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Regression surrogates.
//!
//! Gaussian-process regression behind the [`surrogate::RegressionMethod`]
//! seam, so retention models can be trained with any backend.

pub mod gp;
pub mod kernel;
pub mod surrogate;

pub use gp::{GpModel, GpRegression};
pub use surrogate::{Prediction, RegressionMethod, Surrogate};
