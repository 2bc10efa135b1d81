// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Exposure Conditions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plasma exposure along a divertor target, read from edge-code exports.
//!
//! ITER (SOLPS, `,`-delimited) columns:
//! `x, Te, Ti, D_temp_atm, D_flux_ion, D_flux_atm, Wtot`.
//! Ion energy is `3 Te + 2 Ti`; angles are not exported and default to
//! 60° (ions) and 45° (atoms).
//!
//! WEST (SOLEDGE, `;`-delimited) columns:
//! `s_cell_m, E_imp_ion_eV, E_imp_atom_eV, alpha_V_ion_deg,
//! alpha_V_atom_deg, flux_inc_ion_m2s1, flux_inc_atom_m2s1,
//! net_energy_flux_Wm2`. The target starts at `s = 0.6` m.
//!
//! Missing angles become the defaults above and missing energies become 0.

use std::path::Path;

use divh_types::constants::{
    DEFAULT_ATOM_ANGLE, DEFAULT_ENERGY, DEFAULT_ION_ANGLE, WEST_ARC_LENGTH_ORIGIN,
};
use divh_types::error::RetentionResult;
use divh_types::state::ExpositionFormat;
use ndarray::Array1;
use tracing::{debug, instrument};

use crate::concentration::SurfaceConditions;
use crate::table::DelimitedTable;

/// Exposure profile along the target; every array has the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposition {
    pub format: ExpositionFormat,
    /// Arc length along the target (m)
    pub arc_length: Array1<f64>,
    /// Ion incident energy (eV)
    pub ion_energy: Array1<f64>,
    /// Atom incident energy (eV)
    pub atom_energy: Array1<f64>,
    /// Ion incidence angle (deg)
    pub ion_angle: Array1<f64>,
    /// Atom incidence angle (deg)
    pub atom_angle: Array1<f64>,
    /// Ion flux (m^-2 s^-1)
    pub ion_flux: Array1<f64>,
    /// Atom flux (m^-2 s^-1)
    pub atom_flux: Array1<f64>,
    /// Net heat flux (W/m²)
    pub net_heat_flux: Array1<f64>,
}

fn replace_nan(values: &mut Array1<f64>, default: f64) -> usize {
    let mut replaced = 0;
    values.mapv_inplace(|v| {
        if v.is_nan() {
            replaced += 1;
            default
        } else {
            v
        }
    });
    replaced
}

/// SOLPS-ITER export.
pub fn parse_iter(table: &DelimitedTable) -> RetentionResult<Exposition> {
    let arc_length = table.column("x")?;
    let te = table.column("Te")?;
    let ti = table.column("Ti")?;
    let n = arc_length.len();
    Ok(Exposition {
        format: ExpositionFormat::Iter,
        ion_energy: 3.0 * &te + 2.0 * &ti,
        atom_energy: table.column("D_temp_atm")?,
        ion_angle: Array1::from_elem(n, DEFAULT_ION_ANGLE),
        atom_angle: Array1::from_elem(n, DEFAULT_ATOM_ANGLE),
        ion_flux: table.column("D_flux_ion")?,
        atom_flux: table.column("D_flux_atm")?,
        net_heat_flux: table.column("Wtot")?,
        arc_length,
    })
}

/// SOLEDGE WEST export.
pub fn parse_west(table: &DelimitedTable) -> RetentionResult<Exposition> {
    Ok(Exposition {
        format: ExpositionFormat::West,
        arc_length: table.column("s_cell_m")? - WEST_ARC_LENGTH_ORIGIN,
        ion_energy: table.column("E_imp_ion_eV")?,
        atom_energy: table.column("E_imp_atom_eV")?,
        ion_angle: table.column("alpha_V_ion_deg")?,
        atom_angle: table.column("alpha_V_atom_deg")?,
        ion_flux: table.column("flux_inc_ion_m2s1")?,
        atom_flux: table.column("flux_inc_atom_m2s1")?,
        net_heat_flux: table.column("net_energy_flux_Wm2")?,
    })
}

impl Exposition {
    /// Read `path` with the schema named by `tag` (`"ITER"` or `"WEST"`).
    ///
    /// The tag is checked before the file is touched.
    pub fn from_file_with_tag(path: &Path, tag: &str) -> RetentionResult<Self> {
        let format = tag.parse::<ExpositionFormat>()?;
        Self::from_file(path, format)
    }

    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_file(path: &Path, format: ExpositionFormat) -> RetentionResult<Self> {
        let table = DelimitedTable::read(path, format.delimiter())?;
        Self::from_table(&table, format)
    }

    pub fn parse_str(text: &str, format: ExpositionFormat) -> RetentionResult<Self> {
        let table = DelimitedTable::parse(text, format.delimiter(), format.tag())?;
        Self::from_table(&table, format)
    }

    fn from_table(table: &DelimitedTable, format: ExpositionFormat) -> RetentionResult<Self> {
        let mut exposition = match format {
            ExpositionFormat::Iter => parse_iter(table)?,
            ExpositionFormat::West => parse_west(table)?,
        };
        let angles = replace_nan(&mut exposition.ion_angle, DEFAULT_ION_ANGLE)
            + replace_nan(&mut exposition.atom_angle, DEFAULT_ATOM_ANGLE);
        let energies = replace_nan(&mut exposition.ion_energy, DEFAULT_ENERGY)
            + replace_nan(&mut exposition.atom_energy, DEFAULT_ENERGY);
        debug!(
            %format,
            samples = exposition.len(),
            nan_angles = angles,
            nan_energies = energies,
            "Exposition parsed"
        );
        Ok(exposition)
    }

    pub fn len(&self) -> usize {
        self.arc_length.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arc_length.is_empty()
    }

    /// Borrow as concentration-model inputs at the given surface temperature.
    pub fn surface_conditions<'a>(&'a self, temperature: &'a [f64]) -> SurfaceConditions<'a> {
        SurfaceConditions {
            temperature,
            ion_energy: self.ion_energy.as_slice().unwrap_or(&[]),
            atom_energy: self.atom_energy.as_slice().unwrap_or(&[]),
            ion_angle: self.ion_angle.as_slice().unwrap_or(&[]),
            atom_angle: self.atom_angle.as_slice().unwrap_or(&[]),
            ion_flux: self.ion_flux.as_slice().unwrap_or(&[]),
            atom_flux: self.atom_flux.as_slice().unwrap_or(&[]),
        }
    }
}
