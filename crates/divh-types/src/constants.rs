// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Boltzmann constant (eV/K)
pub const K_B_EV: f64 = 8.617e-5;

/// H diffusivity pre-exponential factor in W (m²/s).
/// Fernandez et al., Acta Materialia (2015), doi:10.1016/j.actamat.2015.04.052
pub const D0_W: f64 = 1.9e-7;

/// H diffusion activation energy in W (eV)
pub const E_D_W: f64 = 0.2;

/// Implantation range prefactor (m·eV^-0.5924)
pub const IMPLANTATION_PREFACTOR: f64 = 1.88e-10;

/// Implantation range energy exponent
pub const IMPLANTATION_EXPONENT: f64 = 0.5924;

/// Surface temperature response to net heat flux (K·m²/W).
/// Delaporte-Mathurin et al., Sci. Rep. (2020), doi:10.1038/s41598-020-74844-w
pub const THERMAL_SLOPE: f64 = 1.1e-4;

/// Coolant-side baseline surface temperature (K)
pub const THERMAL_OFFSET: f64 = 323.0;

/// Default ion incidence angle when none is measured (deg)
pub const DEFAULT_ION_ANGLE: f64 = 60.0;

/// Default atom incidence angle when none is measured (deg)
pub const DEFAULT_ATOM_ANGLE: f64 = 45.0;

/// Energy substituted for missing energy samples (eV)
pub const DEFAULT_ENERGY: f64 = 0.0;

/// Arc length at which the WEST target begins (m)
pub const WEST_ARC_LENGTH_ORIGIN: f64 = 0.6;

/// Default exposure time: about one full operational campaign (s)
pub const DEFAULT_TIME: f64 = 1e7;

/// Temperature of the analytic diffusion-front points (K)
pub const ANALYTIC_TEMPERATURE: f64 = 320.0;

/// H diffusivity used by the analytic diffusion-front points (m²/s)
pub const ANALYTIC_DIFFUSIVITY: f64 = 1.326e-10;

/// Trap density used by the analytic diffusion-front points (m^-3)
pub const ANALYTIC_TRAP_DENSITY: f64 = 6.93e25;
