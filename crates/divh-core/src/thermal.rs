// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Surface Temperature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Monoblock surface temperature from the net heat flux.
//!
//! Linear fit of steady-state thermal simulations of an actively cooled W
//! monoblock (Delaporte-Mathurin et al., Sci. Rep. 2020).

use divh_types::constants::{THERMAL_OFFSET, THERMAL_SLOPE};
use ndarray::Array1;

/// Surface temperature (K) for a net heat flux (W/m²).
pub fn surface_temperature(net_heat_flux: f64) -> f64 {
    THERMAL_SLOPE * net_heat_flux + THERMAL_OFFSET
}

pub fn surface_temperatures(net_heat_flux: &[f64]) -> Array1<f64> {
    net_heat_flux.iter().map(|q| surface_temperature(*q)).collect()
}
