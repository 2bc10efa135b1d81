// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Surface Concentration
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mobile hydrogen concentration at the implantation depth.
//!
//! Steady diffusion balance per species:
//! `c = (1 - R) * flux * R_p / D(T)`, with `D` the W diffusivity of
//! Fernandez et al. (Acta Mater. 2015) scaled by isotope mass.
//! `D` underflows to zero as `T -> 0`; callers pass physical temperatures.

use divh_types::constants::{D0_W, E_D_W, K_B_EV};
use divh_types::error::{ensure_len, RetentionResult};
use divh_types::state::Isotope;
use ndarray::Array1;

use crate::implantation::{implantation_range, ReflectionModel};

/// Hydrogen-isotope diffusivity in W (m²/s).
pub fn diffusivity(temperature: f64, isotope: Isotope) -> f64 {
    D0_W * (-E_D_W / (K_B_EV * temperature)).exp() * isotope.diffusivity_scaling()
}

/// Borrowed per-sample exposure conditions; all slices share one length.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceConditions<'a> {
    /// Surface temperature (K)
    pub temperature: &'a [f64],
    /// Ion incident energy (eV)
    pub ion_energy: &'a [f64],
    /// Atom incident energy (eV)
    pub atom_energy: &'a [f64],
    /// Ion incidence angle (deg)
    pub ion_angle: &'a [f64],
    /// Atom incidence angle (deg)
    pub atom_angle: &'a [f64],
    /// Ion flux (m^-2 s^-1)
    pub ion_flux: &'a [f64],
    /// Atom flux (m^-2 s^-1)
    pub atom_flux: &'a [f64],
}

impl SurfaceConditions<'_> {
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    fn validate(&self) -> RetentionResult<()> {
        let n = self.len();
        ensure_len("ion_energy", n, self.ion_energy.len())?;
        ensure_len("atom_energy", n, self.atom_energy.len())?;
        ensure_len("ion_angle", n, self.ion_angle.len())?;
        ensure_len("atom_angle", n, self.atom_angle.len())?;
        ensure_len("ion_flux", n, self.ion_flux.len())?;
        ensure_len("atom_flux", n, self.atom_flux.len())?;
        Ok(())
    }
}

/// Surface concentration split by incident species (m^-3).
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationBreakdown {
    pub total: Array1<f64>,
    pub ions: Array1<f64>,
    pub atoms: Array1<f64>,
}

impl ConcentrationBreakdown {
    /// Share of the total carried by ions; 0 where the total vanishes.
    pub fn ion_fraction(&self) -> Array1<f64> {
        self.ions
            .iter()
            .zip(self.total.iter())
            .map(|(i, t)| if *t > 0.0 { i / t } else { 0.0 })
            .collect()
    }
}

fn species_term(
    reflection: &ReflectionModel,
    energy: f64,
    angle: f64,
    flux: f64,
    d: f64,
) -> RetentionResult<f64> {
    let r = reflection.coefficient(energy, angle)?;
    let range = implantation_range(energy, angle)?;
    Ok((1.0 - r) * flux * range / d)
}

/// Surface concentration with its ion and atom contributions.
pub fn compute_surface_concentration_breakdown(
    reflection: &ReflectionModel,
    conditions: &SurfaceConditions<'_>,
    isotope: Isotope,
) -> RetentionResult<ConcentrationBreakdown> {
    conditions.validate()?;
    let n = conditions.len();
    let mut ions = Array1::<f64>::zeros(n);
    let mut atoms = Array1::<f64>::zeros(n);
    for i in 0..n {
        let d = diffusivity(conditions.temperature[i], isotope);
        ions[i] = species_term(
            reflection,
            conditions.ion_energy[i],
            conditions.ion_angle[i],
            conditions.ion_flux[i],
            d,
        )?;
        atoms[i] = species_term(
            reflection,
            conditions.atom_energy[i],
            conditions.atom_angle[i],
            conditions.atom_flux[i],
            d,
        )?;
    }
    let total = &ions + &atoms;
    Ok(ConcentrationBreakdown { total, ions, atoms })
}

/// Total surface concentration (m^-3).
pub fn compute_surface_concentration(
    reflection: &ReflectionModel,
    conditions: &SurfaceConditions<'_>,
    isotope: Isotope,
) -> RetentionResult<Array1<f64>> {
    compute_surface_concentration_breakdown(reflection, conditions, isotope).map(|b| b.total)
}
