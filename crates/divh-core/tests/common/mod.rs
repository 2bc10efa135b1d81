// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Integration Test Fixtures
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![allow(dead_code)]

use std::path::Path;

use divh_core::database::{HIGH_TEMP_DIR, LOW_TEMP_DIR, REFLECTION_TABLE};
use divh_ml::surrogate::{Prediction, RegressionMethod, Surrogate};
use divh_types::error::RetentionResult;
use ndarray::{Array1, Array2};

/// Reflection falling with log10 E and rising with angle, kept inside (0, 1).
pub fn reflection_truth(log_e: f64, angle: f64) -> f64 {
    (0.6 - 0.13 * log_e + 0.2 * (angle / 90.0).powi(2)).clamp(0.03, 0.9)
}

/// Reference table, simulation corpus and nothing else under `root`.
pub fn write_dataset(root: &Path) {
    let mut table = String::from("Incident_energy;theta_inc;Reflection_coeff\n");
    for i in 0..30 {
        let log_e = 0.3 + 3.2 * i as f64 / 29.0;
        for angle in [0.0, 15.0, 30.0, 45.0, 60.0, 80.0] {
            table.push_str(&format!(
                "{};{angle};{}\n",
                10f64.powf(log_e),
                reflection_truth(log_e, angle)
            ));
        }
    }
    std::fs::write(root.join(REFLECTION_TABLE), table).unwrap();

    let series = |dir: &Path, t_k: f64, e1: i32, decades: (f64, f64), factor: f64| {
        let c = 10f64.powi(e1);
        let k = 3e13 * (c / 1e20).powf(0.7) * (t_k / 500.0).powf(1.5);
        let mut text = String::from("t(s),solute,trap_1,trap_2,trap_3\n");
        for i in 0..25 {
            let t = 10f64.powf(decades.0 + (decades.1 - decades.0) * i as f64 / 24.0);
            let total = k * t.powf(0.5) / factor;
            text.push_str(&format!("{t},1.0,{},{},{}\n", 0.6 * total, 0.3 * total, 0.1 * total));
        }
        let name = format!("T={:.2}e+02_c=1.00e+{e1}.csv", t_k / 100.0);
        std::fs::write(dir.join(name), text).unwrap();
    };
    let high = root.join(HIGH_TEMP_DIR);
    let low = root.join(LOW_TEMP_DIR);
    std::fs::create_dir_all(&high).unwrap();
    std::fs::create_dir_all(&low).unwrap();
    for t_k in [450.0, 600.0, 750.0, 900.0, 1050.0] {
        for e1 in 20..=23 {
            series(&high, t_k, e1, (4.0, 7.0), 2.0);
        }
    }
    for t_k in [330.0, 380.0] {
        for e1 in 20..=23 {
            series(&low, t_k, e1, (2.0, 5.0), 0.03);
        }
    }
}

/// SOLEDGE-style WEST export with some `nan` angles and empty energies.
pub fn west_text(rows: usize) -> String {
    let mut text = String::from(
        "s_cell_m;E_imp_ion_eV;E_imp_atom_eV;alpha_V_ion_deg;alpha_V_atom_deg;\
         flux_inc_ion_m2s1;flux_inc_atom_m2s1;net_energy_flux_Wm2\n",
    );
    for i in 0..rows {
        let x = i as f64 / rows as f64;
        let ion_angle = if i % 9 == 4 { "nan".to_string() } else { format!("{}", 50.0 + 20.0 * x) };
        let atom_energy = if i % 13 == 7 { String::new() } else { format!("{}", 2.0 + 3.0 * x) };
        text.push_str(&format!(
            "{};{};{atom_energy};{ion_angle};{};{};{};{}\n",
            0.6 + 0.004 * i as f64,
            15.0 + 60.0 * x,
            35.0 + 10.0 * x,
            1e21 + 4e22 * x * (1.0 - x),
            5e20 + 2e21 * x,
            2e5 + 4e6 * x * (1.0 - x)
        ));
    }
    text
}

/// SOLPS-ITER export; angles are never part of this schema.
pub fn iter_text(rows: usize) -> String {
    let mut text = String::from("# x,Te,Ti,D_temp_atm,D_flux_ion,D_flux_atm,Wtot\n");
    for i in 0..rows {
        let x = 0.02 * i as f64;
        text.push_str(&format!(
            "{x},{},{},{},{},{},{}\n",
            4.0 + 10.0 * x,
            6.0 + 8.0 * x,
            if i == 3 { "nan".to_string() } else { format!("{}", 1.0 + x) },
            5e22 * (1.0 + x),
            2e22,
            1e6 * (1.0 + 5.0 * x)
        ));
    }
    text
}

/// Regression stand-in returning a fixed mean.
#[derive(Debug)]
pub struct Fixed(pub f64);

impl Surrogate for Fixed {
    fn n_inputs(&self) -> usize {
        2
    }
    fn predict(&self, _point: &[f64]) -> RetentionResult<Prediction> {
        Ok(Prediction {
            mean: self.0,
            stdev: 0.0,
        })
    }
}

impl RegressionMethod for Fixed {
    fn fit(&self, _x: &Array2<f64>, _y: &Array1<f64>) -> RetentionResult<Box<dyn Surrogate>> {
        Ok(Box::new(Fixed(self.0)))
    }
}
