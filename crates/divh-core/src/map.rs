// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Inventory Map
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Inventory surrogate evaluated over a (temperature, concentration) grid.
//!
//! Temperature is linear and concentration log-spaced, so contour levels
//! over the map are log-spaced too ([`InventoryMap::levels`]).

use divh_math::interp::{linspace, logspace};
use divh_types::error::{RetentionError, RetentionResult};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::inventory::InventoryModel;

/// Grid extent and resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapGrid {
    pub temperature_range: [f64; 2],
    pub concentration_range: [f64; 2],
    pub n_temperature: usize,
    pub n_concentration: usize,
}

impl Default for MapGrid {
    fn default() -> Self {
        MapGrid {
            temperature_range: [320.0, 1200.0],
            concentration_range: [1e20, 1e23],
            n_temperature: 50,
            n_concentration: 10,
        }
    }
}

impl MapGrid {
    pub fn validate(&self) -> RetentionResult<()> {
        let [t_min, t_max] = self.temperature_range;
        let [c_min, c_max] = self.concentration_range;
        if !(t_min.is_finite() && t_max.is_finite() && t_min <= t_max) {
            return Err(RetentionError::ConfigError(format!(
                "Temperature range must be finite and ordered, got [{t_min}, {t_max}]"
            )));
        }
        if !(c_min.is_finite() && c_max.is_finite() && c_min > 0.0 && c_min <= c_max) {
            return Err(RetentionError::ConfigError(format!(
                "Concentration range must be positive and ordered, got [{c_min}, {c_max}]"
            )));
        }
        if self.n_temperature == 0 || self.n_concentration == 0 {
            return Err(RetentionError::ConfigError(
                "Map grid needs at least one sample per axis".to_string(),
            ));
        }
        Ok(())
    }

    pub fn temperature(&self) -> Array1<f64> {
        let [lo, hi] = self.temperature_range;
        linspace(lo, hi, self.n_temperature)
    }

    pub fn concentration(&self) -> Array1<f64> {
        let [lo, hi] = self.concentration_range;
        logspace(lo.log10(), hi.log10(), self.n_concentration)
    }
}

/// Inventory and stdev, indexed `[concentration, temperature]`.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryMap {
    pub time: f64,
    pub temperature: Array1<f64>,
    pub concentration: Array1<f64>,
    pub inventory: Array2<f64>,
    pub stdev: Array2<f64>,
    pub min: f64,
    pub max: f64,
}

impl InventoryMap {
    pub fn compute(model: &InventoryModel, grid: &MapGrid) -> RetentionResult<Self> {
        grid.validate()?;
        let temperature = grid.temperature();
        let concentration = grid.concentration();
        let (nc, nt) = (concentration.len(), temperature.len());

        let rows: Vec<Vec<(f64, f64)>> = concentration
            .as_slice()
            .unwrap_or(&[])
            .par_iter()
            .map(|c| {
                temperature
                    .iter()
                    .map(|t| model.predict(*t, *c).map(|p| (p.mean, p.stdev)))
                    .collect::<RetentionResult<Vec<_>>>()
            })
            .collect::<RetentionResult<Vec<_>>>()?;

        let inventory = Array2::from_shape_fn((nc, nt), |(i, j)| rows[i][j].0);
        let stdev = Array2::from_shape_fn((nc, nt), |(i, j)| rows[i][j].1);
        let min = inventory.iter().copied().fold(f64::INFINITY, f64::min);
        let max = inventory.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(InventoryMap {
            time: model.time(),
            temperature,
            concentration,
            inventory,
            stdev,
            min,
            max,
        })
    }

    /// `n` contour levels log-spaced between the map extrema.
    pub fn levels(&self, n: usize) -> RetentionResult<Array1<f64>> {
        if !(self.min > 0.0 && self.max.is_finite()) {
            return Err(RetentionError::DomainError(format!(
                "Log-spaced levels need a positive finite range, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(logspace(self.min.log10(), self.max.log10(), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::write_corpus;
    use crate::database::{DataPaths, SimulationDatabase};
    use divh_ml::surrogate::{Prediction, RegressionMethod, Surrogate};
    use divh_types::config::{DatabaseConfig, InventoryConfig};

    /// `log10 inv = 14 + T / 1000 + 0.5 (log10 c - 20)`
    #[derive(Debug)]
    struct Plane;

    impl Surrogate for Plane {
        fn n_inputs(&self) -> usize {
            2
        }
        fn predict(&self, point: &[f64]) -> RetentionResult<Prediction> {
            Ok(Prediction {
                mean: 14.0 + point[0] / 1000.0 + 0.5 * (point[1] - 20.0),
                stdev: 0.05,
            })
        }
    }

    #[derive(Debug)]
    struct PlaneMethod;

    impl RegressionMethod for PlaneMethod {
        fn fit(&self, _x: &Array2<f64>, _y: &Array1<f64>) -> RetentionResult<Box<dyn Surrogate>> {
            Ok(Box::new(Plane))
        }
    }

    fn model() -> InventoryModel {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let db = SimulationDatabase::load(&DataPaths::new(dir.path()), &DatabaseConfig::default())
            .unwrap();
        InventoryModel::fit(&db, 1e7, &InventoryConfig::default(), &PlaneMethod).unwrap()
    }

    #[test]
    fn test_default_grid() {
        let grid = MapGrid::default();
        let t = grid.temperature();
        let c = grid.concentration();
        assert_eq!(t.len(), 50);
        assert_eq!(c.len(), 10);
        assert_eq!((t[0], t[49]), (320.0, 1200.0));
        assert!((c[0] / 1e20 - 1.0).abs() < 1e-12);
        assert!((c[9] / 1e23 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_map_values_and_extrema() {
        let m = InventoryMap::compute(&model(), &MapGrid::default()).unwrap();
        assert_eq!(m.inventory.dim(), (10, 50));
        assert_eq!(m.stdev.dim(), (10, 50));
        assert_eq!(m.time, 1e7);
        let expected = 10f64.powf(14.0 + 0.32);
        assert!((m.inventory[[0, 0]] / expected - 1.0).abs() < 1e-9);
        assert_eq!(m.min, m.inventory[[0, 0]]);
        assert_eq!(m.max, m.inventory[[9, 49]]);
        assert!(m.stdev.iter().all(|s| *s == 0.05));
    }

    #[test]
    fn test_levels_span_extrema() {
        let m = InventoryMap::compute(&model(), &MapGrid::default()).unwrap();
        let levels = m.levels(12).unwrap();
        assert_eq!(levels.len(), 12);
        assert!((levels[0] / m.min - 1.0).abs() < 1e-9);
        assert!((levels[11] / m.max - 1.0).abs() < 1e-9);
        assert!(levels.windows(2).into_iter().all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_invalid_grid() {
        let bad = MapGrid {
            concentration_range: [0.0, 1e22],
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(RetentionError::ConfigError(_))));
        let empty = MapGrid {
            n_temperature: 0,
            ..Default::default()
        };
        assert!(InventoryMap::compute(&model(), &empty).is_err());
    }
}
