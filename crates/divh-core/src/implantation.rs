// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Implantation Coefficients
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Implantation range and particle reflection coefficient of W.
//!
//! The reflection coefficient is a GP surrogate of a TRIM energy/angle
//! table, trained once on `(log10 E, theta)`. Angles are in degrees from
//! the surface normal.

use std::path::Path;

use divh_ml::surrogate::{RegressionMethod, Surrogate};
use divh_types::config::ReflectionConfig;
use divh_types::constants::{IMPLANTATION_EXPONENT, IMPLANTATION_PREFACTOR};
use divh_types::error::{ensure_len, RetentionError, RetentionResult};
use ndarray::{Array1, Array2};
use tracing::{info, instrument};

use crate::table::DelimitedTable;

pub const ENERGY_COLUMN: &str = "Incident_energy";
pub const ANGLE_COLUMN: &str = "theta_inc";
pub const REFLECTION_COLUMN: &str = "Reflection_coeff";

fn check_energy(energy: f64) -> RetentionResult<()> {
    if !energy.is_finite() || energy < 0.0 {
        return Err(RetentionError::DomainError(format!(
            "Incident energy must be finite and >= 0 eV, got {energy}"
        )));
    }
    Ok(())
}

/// Mean implantation depth in W (m): `1.88e-10 * E^0.5924`.
///
/// There is no angular dependence; `_angle` is accepted for symmetry with
/// [`ReflectionModel::coefficient`].
pub fn implantation_range(energy: f64, _angle: f64) -> RetentionResult<f64> {
    check_energy(energy)?;
    Ok(IMPLANTATION_PREFACTOR * energy.powf(IMPLANTATION_EXPONENT))
}

/// Element-wise [`implantation_range`].
pub fn implantation_ranges(energy: &[f64], angle: &[f64]) -> RetentionResult<Array1<f64>> {
    ensure_len("angle", energy.len(), angle.len())?;
    energy
        .iter()
        .zip(angle.iter())
        .map(|(e, a)| implantation_range(*e, *a))
        .collect()
}

/// Reflection coefficient surrogate.
#[derive(Debug)]
pub struct ReflectionModel {
    surrogate: Box<dyn Surrogate>,
    n_training: usize,
}

impl ReflectionModel {
    /// Train from the `;`-delimited TRIM table at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_table(
        path: &Path,
        config: &ReflectionConfig,
        method: &dyn RegressionMethod,
    ) -> RetentionResult<Self> {
        if !path.is_file() {
            return Err(RetentionError::DatasetMissing(path.display().to_string()));
        }
        let table = DelimitedTable::read(path, ';')?;
        let energy = table.column(ENERGY_COLUMN)?;
        let angle = table.column(ANGLE_COLUMN)?;
        let coeff = table.column(REFLECTION_COLUMN)?;
        Self::from_samples(
            &energy.to_vec(),
            &angle.to_vec(),
            &coeff.to_vec(),
            config,
            method,
        )
    }

    /// Train from explicit table columns, keeping every `table_stride`-th row.
    ///
    /// Rows with non-positive or non-finite energy, or a non-finite angle or
    /// coefficient, carry no usable sample and are skipped after striding.
    pub fn from_samples(
        energy: &[f64],
        angle: &[f64],
        coefficient: &[f64],
        config: &ReflectionConfig,
        method: &dyn RegressionMethod,
    ) -> RetentionResult<Self> {
        ensure_len("theta_inc", energy.len(), angle.len())?;
        ensure_len("Reflection_coeff", energy.len(), coefficient.len())?;
        if config.table_stride == 0 {
            return Err(RetentionError::ConfigError(
                "reflection.table_stride must be >= 1".to_string(),
            ));
        }

        let samples: Vec<[f64; 3]> = (0..energy.len())
            .step_by(config.table_stride)
            .map(|i| [energy[i], angle[i], coefficient[i]])
            .filter(|[e, a, r]| e.is_finite() && *e > 0.0 && a.is_finite() && r.is_finite())
            .collect();

        let n = samples.len();
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                samples[i][0].log10()
            } else {
                samples[i][1]
            }
        });
        let y = Array1::from_shape_fn(n, |i| samples[i][2]);
        let surrogate = method.fit(&x, &y)?;
        info!(
            table_rows = energy.len(),
            training_samples = n,
            "Reflection coefficient surrogate trained"
        );
        Ok(ReflectionModel {
            surrogate,
            n_training: n,
        })
    }

    pub fn n_training(&self) -> usize {
        self.n_training
    }

    /// Fraction of incident particles reflected, in `[0, 1]`.
    ///
    /// Zero energy means nothing arrives and yields exactly 0.
    pub fn coefficient(&self, energy: f64, angle: f64) -> RetentionResult<f64> {
        check_energy(energy)?;
        if !angle.is_finite() {
            return Err(RetentionError::DomainError(format!(
                "Incidence angle must be finite, got {angle}"
            )));
        }
        if energy == 0.0 {
            return Ok(0.0);
        }
        let p = self.surrogate.predict(&[energy.log10(), angle])?;
        Ok(p.mean.clamp(0.0, 1.0))
    }

    /// Element-wise [`ReflectionModel::coefficient`].
    pub fn coefficients(&self, energy: &[f64], angle: &[f64]) -> RetentionResult<Array1<f64>> {
        ensure_len("angle", energy.len(), angle.len())?;
        energy
            .iter()
            .zip(angle.iter())
            .map(|(e, a)| self.coefficient(*e, *a))
            .collect()
    }
}
