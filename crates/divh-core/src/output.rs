// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Exposition Results
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Result records of the retention pipeline and their `.npz` export.

use std::fs::File;
use std::path::Path;

use divh_types::error::{ensure_len, RetentionError, RetentionResult};
use divh_types::state::{ExpositionFormat, Isotope};
use ndarray::{arr0, Array1, ArrayBase, Data, Dimension};
use ndarray_npy::NpzWriter;
use serde::{Deserialize, Serialize};

use crate::concentration::ConcentrationBreakdown;

/// Processing stage reached by an exposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Raw,
    TemperatureComputed,
    ConcentrationComputed,
    InventoryComputed,
}

/// Inventory along the target at one exposure time.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryProfile {
    /// Exposure time (s)
    pub time: f64,
    /// Retained inventory (H/m)
    pub inventory: Array1<f64>,
    /// Predictive stdev of `log10 inventory`
    pub stdev: Array1<f64>,
}

impl InventoryProfile {
    /// Lower and upper band `10^(log10 inv ∓ z stdev)`.
    ///
    /// Samples with zero inventory have a zero-width band; NaN stays NaN.
    pub fn bounds(&self, zscore: f64) -> RetentionResult<(Array1<f64>, Array1<f64>)> {
        if !zscore.is_finite() || zscore < 0.0 {
            return Err(RetentionError::DomainError(format!(
                "zscore must be finite and >= 0, got {zscore}"
            )));
        }
        let band = |sign: f64| -> Array1<f64> {
            self.inventory
                .iter()
                .zip(self.stdev.iter())
                .map(|(inv, sd)| {
                    if inv.is_nan() {
                        f64::NAN
                    } else if *inv > 0.0 {
                        10f64.powf(inv.log10() + sign * zscore * sd)
                    } else {
                        0.0
                    }
                })
                .collect()
        };
        Ok((band(-1.0), band(1.0)))
    }

    /// Inventory integrated along the target with the trapezoid rule (H).
    pub fn integrated(&self, arc_length: &Array1<f64>) -> RetentionResult<f64> {
        ensure_len("arc_length", self.inventory.len(), arc_length.len())?;
        Ok(arc_length
            .windows(2)
            .into_iter()
            .zip(self.inventory.windows(2))
            .map(|(s, inv)| 0.5 * (inv[0] + inv[1]) * (s[1] - s[0]))
            .sum())
    }
}

/// Everything computed for one exposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpositionOutput {
    pub format: ExpositionFormat,
    pub isotope: Isotope,
    /// Arc length along the target (m)
    pub arc_length: Array1<f64>,
    /// Surface temperature (K)
    pub temperature: Array1<f64>,
    /// Surface concentration, total and per species (m^-3)
    pub concentration: ConcentrationBreakdown,
    pub inventory: Option<InventoryProfile>,
}

fn add<S, D>(writer: &mut NpzWriter<File>, name: &str, array: &ArrayBase<S, D>) -> RetentionResult<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    writer
        .add_array(name, array)
        .map_err(|e| RetentionError::Npy(format!("Failed to write {name} to npz: {e}")))
}

impl ExpositionOutput {
    pub fn stage(&self) -> Stage {
        if self.inventory.is_some() {
            Stage::InventoryComputed
        } else {
            Stage::ConcentrationComputed
        }
    }

    pub fn len(&self) -> usize {
        self.arc_length.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arc_length.is_empty()
    }

    /// Write every array to a NumPy `.npz` archive.
    ///
    /// Keys: `arc_length`, `temperature`, `concentration`,
    /// `ion_concentration`, `atom_concentration`, and when present
    /// `inventory`, `inventory_stdev` and the scalar `time`.
    pub fn write_npz(&self, path: &Path) -> RetentionResult<()> {
        let file = File::create(path)?;
        let mut writer = NpzWriter::new(file);
        add(&mut writer, "arc_length", &self.arc_length)?;
        add(&mut writer, "temperature", &self.temperature)?;
        add(&mut writer, "concentration", &self.concentration.total)?;
        add(&mut writer, "ion_concentration", &self.concentration.ions)?;
        add(&mut writer, "atom_concentration", &self.concentration.atoms)?;
        if let Some(profile) = &self.inventory {
            add(&mut writer, "inventory", &profile.inventory)?;
            add(&mut writer, "inventory_stdev", &profile.stdev)?;
            add(&mut writer, "time", &arr0(profile.time))?;
        }
        writer
            .finish()
            .map_err(|e| RetentionError::Npy(format!("Failed to finish npz: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Ix0, Ix1, OwnedRepr};
    use ndarray_npy::NpzReader;

    fn profile() -> InventoryProfile {
        InventoryProfile {
            time: 1e7,
            inventory: array![1e18, 0.0, 4e19],
            stdev: array![0.1, 0.0, 0.25],
        }
    }

    fn output(with_inventory: bool) -> ExpositionOutput {
        ExpositionOutput {
            format: ExpositionFormat::West,
            isotope: Isotope::D,
            arc_length: array![0.0, 0.01, 0.02],
            temperature: array![400.0, 500.0, 650.0],
            concentration: ConcentrationBreakdown {
                total: array![3e21, 2e21, 1e22],
                ions: array![2e21, 2e21, 6e21],
                atoms: array![1e21, 0.0, 4e21],
            },
            inventory: with_inventory.then(profile),
        }
    }

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Raw < Stage::TemperatureComputed);
        assert!(Stage::ConcentrationComputed < Stage::InventoryComputed);
        assert_eq!(output(false).stage(), Stage::ConcentrationComputed);
        assert_eq!(output(true).stage(), Stage::InventoryComputed);
    }

    #[test]
    fn test_bounds_bracket_inventory() {
        let p = profile();
        let (lo, hi) = p.bounds(2.0).unwrap();
        assert!((lo[0] / 10f64.powf(18.0 - 0.2) - 1.0).abs() < 1e-12);
        assert!((hi[0] / 10f64.powf(18.0 + 0.2) - 1.0).abs() < 1e-12);
        assert_eq!((lo[1], hi[1]), (0.0, 0.0));
        assert!(lo[2] < p.inventory[2] && p.inventory[2] < hi[2]);

        let (lo, hi) = p.bounds(0.0).unwrap();
        for i in 0..3 {
            assert!((lo[i] - p.inventory[i]).abs() <= 1e-12 * p.inventory[i]);
            assert!((hi[i] - p.inventory[i]).abs() <= 1e-12 * p.inventory[i]);
        }
    }

    #[test]
    fn test_bounds_rejects_bad_zscore() {
        let p = profile();
        for z in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(p.bounds(z), Err(RetentionError::DomainError(_))));
        }
    }

    #[test]
    fn test_integrated_inventory() {
        let p = InventoryProfile {
            time: 1e6,
            inventory: array![2.0, 2.0, 2.0],
            stdev: array![0.0, 0.0, 0.0],
        };
        let total = p.integrated(&array![0.0, 0.5, 1.5]).unwrap();
        assert!((total - 3.0).abs() < 1e-12);
        assert!(p.integrated(&array![0.0, 1.0]).is_err());
    }

    fn read1(npz: &mut NpzReader<File>, key: &str) -> Array1<f64> {
        npz.by_name::<OwnedRepr<f64>, Ix1>(&format!("{key}.npy"))
            .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix1>(key))
            .unwrap()
    }

    #[test]
    fn test_write_npz_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("west.npz");
        let out = output(true);
        out.write_npz(&path).unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(npz.len(), 8);
        assert_eq!(read1(&mut npz, "temperature"), out.temperature);
        assert_eq!(read1(&mut npz, "atom_concentration"), out.concentration.atoms);
        assert_eq!(read1(&mut npz, "inventory_stdev"), array![0.1, 0.0, 0.25]);
        let time = npz
            .by_name::<OwnedRepr<f64>, Ix0>("time.npy")
            .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix0>("time"))
            .unwrap();
        assert_eq!(time.into_scalar(), 1e7);
    }

    #[test]
    fn test_write_npz_without_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iter.npz");
        output(false).write_npz(&path).unwrap();
        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(npz.len(), 5);
    }
}
