// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Simulation Database
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Monoblock inventory time series from transport simulations.
//!
//! Each CSV holds one operating point `(T, c)`, encoded in its file name.
//! High-temperature runs are extended back to `1e2..1e4` s and
//! low-temperature runs forward to `1e5..1e7` s with a fitted power law.
//! Analytic diffusion-front series at 320 K complete the corpus.
//!
//! Expected layout under the data directory:
//!
//! ```text
//! data_TRIM_energy_angle.csv
//! mb_high_temp/*.csv
//! mb_low_temp/*.csv
//! ```

use std::path::{Path, PathBuf};

use divh_math::interp::{interp1d, logspace};
use divh_math::regression::fit_power_law;
use divh_types::config::DatabaseConfig;
use divh_types::constants::{ANALYTIC_DIFFUSIVITY, ANALYTIC_TEMPERATURE, ANALYTIC_TRAP_DENSITY};
use divh_types::error::{RetentionError, RetentionResult};
use ndarray::Array1;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::table::DelimitedTable;

pub const REFLECTION_TABLE: &str = "data_TRIM_energy_angle.csv";
pub const HIGH_TEMP_DIR: &str = "mb_high_temp";
pub const LOW_TEMP_DIR: &str = "mb_low_temp";

/// Locations of the reference datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataPaths { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reflection_table(&self) -> PathBuf {
        self.root.join(REFLECTION_TABLE)
    }

    pub fn high_temp_dir(&self) -> PathBuf {
        self.root.join(HIGH_TEMP_DIR)
    }

    pub fn low_temp_dir(&self) -> PathBuf {
        self.root.join(LOW_TEMP_DIR)
    }
}

/// Where a series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOrigin {
    HighTemperature,
    LowTemperature,
    Analytic,
}

/// One operating point with its inventory history.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationPoint {
    /// Surface temperature (K)
    pub temperature: f64,
    /// Surface concentration (m^-3)
    pub concentration: f64,
    /// Exposure time (s), non-decreasing
    pub time: Array1<f64>,
    /// Inventory per unit length (H/m)
    pub inventory: Array1<f64>,
    pub origin: PointOrigin,
}

impl SimulationPoint {
    /// Build a point; samples are stably sorted by time.
    pub fn new(
        temperature: f64,
        concentration: f64,
        time: Vec<f64>,
        inventory: Vec<f64>,
        origin: PointOrigin,
    ) -> RetentionResult<Self> {
        if time.len() != inventory.len() {
            return Err(RetentionError::ShapeMismatch {
                name: "inventory".to_string(),
                expected: time.len(),
                got: inventory.len(),
            });
        }
        let mut pairs: Vec<(f64, f64)> = time.into_iter().zip(inventory).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (time, inventory): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        Ok(SimulationPoint {
            temperature,
            concentration,
            time: Array1::from_vec(time),
            inventory: Array1::from_vec(inventory),
            origin,
        })
    }

    /// Inventory at `time`, linear in time between samples.
    pub fn inventory_at(&self, time: f64) -> RetentionResult<f64> {
        interp1d(
            self.time.as_slice().unwrap_or(&[]),
            self.inventory.as_slice().unwrap_or(&[]),
            time,
        )
    }
}

/// Operating point `(T, c)` from a file name.
///
/// The first four unsigned numeric tokens `m0, e0, m1, e1` give
/// `T = m0 * 10^e0` and `c = m1 * 10^e1`; e.g. `T=1.2e+03_c=5.0e+21.csv`.
pub fn parse_operating_point(file_name: &str) -> RetentionResult<(f64, f64)> {
    let mut tokens: Vec<f64> = Vec::new();
    let bytes = file_name.as_bytes();
    let mut i = 0;
    while i < bytes.len() && tokens.len() < 4 {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        let token = &file_name[start..i];
        let value = token.parse::<f64>().map_err(|e| RetentionError::Parse {
            source_name: file_name.to_string(),
            line: 0,
            message: format!("bad numeric token '{token}': {e}"),
        })?;
        tokens.push(value);
    }
    if tokens.len() < 4 {
        return Err(RetentionError::Parse {
            source_name: file_name.to_string(),
            line: 0,
            message: format!(
                "expected 4 numeric tokens encoding (T, c), found {}",
                tokens.len()
            ),
        });
    }
    Ok((
        tokens[0] * 10f64.powf(tokens[1]),
        tokens[2] * 10f64.powf(tokens[3]),
    ))
}

fn sorted_csv_files(dir: &Path) -> RetentionResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(RetentionError::DatasetMissing(dir.display().to_string()));
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if files.is_empty() {
        return Err(RetentionError::DatasetMissing(format!(
            "{} contains no .csv files",
            dir.display()
        )));
    }
    Ok(files)
}

/// Time column and `factor * (sum of the last three columns)`.
fn read_series(path: &Path, factor: f64) -> RetentionResult<(Vec<f64>, Vec<f64>)> {
    let table = DelimitedTable::read(path, ',')?;
    let n_cols = table.headers().len();
    if n_cols < 4 {
        return Err(RetentionError::Parse {
            source_name: path.display().to_string(),
            line: 1,
            message: format!("expected time plus 3 inventory columns, found {n_cols} columns"),
        });
    }
    let time = table.rows().iter().map(|r| r[0]).collect();
    let inventory = table
        .rows()
        .iter()
        .map(|r| factor * (r[n_cols - 1] + r[n_cols - 2] + r[n_cols - 3]))
        .collect();
    Ok((time, inventory))
}

fn load_extended(
    path: &Path,
    origin: PointOrigin,
    config: &DatabaseConfig,
) -> RetentionResult<SimulationPoint> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (temperature, concentration) = parse_operating_point(&name)?;
    let (factor, window) = match origin {
        PointOrigin::HighTemperature => (config.high_temp_factor, config.early_window_log10),
        _ => (config.monoblock_thickness, config.late_window_log10),
    };
    let (time, inventory) = read_series(path, factor)?;
    let law = fit_power_law(&time, &inventory)?;

    let t_ext = logspace(window[0], window[1], config.extension_samples).to_vec();
    let inv_ext: Vec<f64> = t_ext.iter().map(|t| law.eval(*t)).collect();
    let (time, inventory) = if origin == PointOrigin::HighTemperature {
        ([t_ext, time].concat(), [inv_ext, inventory].concat())
    } else {
        ([time, t_ext].concat(), [inventory, inv_ext].concat())
    };
    debug!(
        file = %name,
        temperature,
        concentration,
        a = law.a,
        b = law.b,
        "Loaded simulation series"
    );
    SimulationPoint::new(temperature, concentration, time, inventory, origin)
}

/// Analytic diffusion-front series at 320 K.
///
/// The front depth `e = sqrt(2 D c t / n)` fills traps of density `n`
/// across a monoblock of thickness `thickness`.
pub fn analytic_points(thickness: f64) -> Vec<SimulationPoint> {
    let decades = [22.0, 21.0, 20.0];
    let time = logspace(2.0, 7.0, 100);
    let mut points = Vec::with_capacity(21);
    for decade in decades {
        for c in logspace(decade + 2f64.log10(), decade + 1.0, 7).iter() {
            let inventory: Vec<f64> = time
                .iter()
                .map(|t| {
                    let e = (t * 2.0 * ANALYTIC_DIFFUSIVITY * c / ANALYTIC_TRAP_DENSITY).sqrt();
                    ANALYTIC_TRAP_DENSITY * e * thickness
                })
                .collect();
            points.push(SimulationPoint {
                temperature: ANALYTIC_TEMPERATURE,
                concentration: *c,
                time: time.clone(),
                inventory: Array1::from_vec(inventory),
                origin: PointOrigin::Analytic,
            });
        }
    }
    points
}

/// Ordered training corpus: high-temperature, low-temperature, analytic.
#[derive(Debug, Clone, Default)]
pub struct SimulationDatabase {
    points: Vec<SimulationPoint>,
}

impl SimulationDatabase {
    #[instrument(skip_all, fields(root = %paths.root().display()))]
    pub fn load(paths: &DataPaths, config: &DatabaseConfig) -> RetentionResult<Self> {
        let high = sorted_csv_files(&paths.high_temp_dir())?;
        let low = sorted_csv_files(&paths.low_temp_dir())?;

        let mut points = high
            .par_iter()
            .map(|p| load_extended(p, PointOrigin::HighTemperature, config))
            .collect::<RetentionResult<Vec<_>>>()?;
        points.extend(
            low.par_iter()
                .map(|p| load_extended(p, PointOrigin::LowTemperature, config))
                .collect::<RetentionResult<Vec<_>>>()?,
        );
        points.extend(analytic_points(config.monoblock_thickness));

        info!(
            high_temp = high.len(),
            low_temp = low.len(),
            total = points.len(),
            "Simulation database loaded"
        );
        Ok(SimulationDatabase { points })
    }

    /// Corpus from already-built points, kept in the given order.
    pub fn from_points(points: Vec<SimulationPoint>) -> Self {
        SimulationDatabase { points }
    }

    pub fn points(&self) -> &[SimulationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point whose `(T, c)` matches exactly.
    pub fn find(&self, temperature: f64, concentration: f64) -> Option<&SimulationPoint> {
        self.points
            .iter()
            .find(|p| p.temperature == temperature && p.concentration == concentration)
    }

    /// Inventory of the exactly matching point at `time`.
    pub fn inventory_at(
        &self,
        temperature: f64,
        concentration: f64,
        time: f64,
    ) -> RetentionResult<f64> {
        self.find(temperature, concentration)
            .ok_or(RetentionError::PointNotFound {
                temperature,
                concentration,
            })?
            .inventory_at(time)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write a synthetic FESTIM-like corpus following the on-disk layout.
    ///
    /// Inventory grows as `k * t^0.5` with `k` rising in T and c.
    pub(crate) fn write_corpus(root: &Path) {
        let high = root.join(HIGH_TEMP_DIR);
        let low = root.join(LOW_TEMP_DIR);
        std::fs::create_dir_all(&high).unwrap();
        std::fs::create_dir_all(&low).unwrap();
        let write = |dir: &Path, t_k: f64, e1: i32, t_range: (f64, f64), factor: f64| {
            let name = format!("T={:.2}e+02_c=1.00e+{e1}.csv", t_k / 100.0);
            let c = 10f64.powf(f64::from(e1));
            let mut text = String::from("t(s),retention_1,retention_2,retention_3,retention_4\n");
            for i in 0..30 {
                let t = 10f64.powf(t_range.0 + (t_range.1 - t_range.0) * i as f64 / 29.0);
                let k = 1e14 * (c / 1e20).powf(0.8) * (t_k / 400.0);
                let total = k * t.sqrt() / factor;
                text.push_str(&format!(
                    "{t},{},{},{},{}\n",
                    0.0,
                    0.5 * total,
                    0.3 * total,
                    0.2 * total
                ));
            }
            std::fs::write(dir.join(name), text).unwrap();
        };
        for t_k in [500.0, 700.0, 900.0, 1100.0] {
            for e1 in 20..=23 {
                write(&high, t_k, e1, (4.0, 7.0), 2.0);
            }
        }
        for t_k in [350.0, 400.0] {
            for e1 in 20..=23 {
                write(&low, t_k, e1, (2.0, 5.0), 0.03);
            }
        }
    }

    #[test]
    fn test_parse_operating_point() {
        let (t, c) = parse_operating_point("T=1.2e+03_c=5.0e+21.csv").unwrap();
        assert!((t - 1200.0).abs() < 1e-9);
        assert!((c / 5e21 - 1.0).abs() < 1e-12);
        let (t, c) = parse_operating_point("mb_3.5e02_1e20.csv").unwrap();
        assert!((t - 350.0).abs() < 1e-9);
        assert!((c / 1e20 - 1.0).abs() < 1e-12);
        assert!(matches!(
            parse_operating_point("T=700.csv"),
            Err(RetentionError::Parse { .. })
        ));
    }

    #[test]
    fn test_points_sorted_by_time() {
        let p = SimulationPoint::new(
            500.0,
            1e21,
            vec![3.0, 1.0, 2.0, 2.0],
            vec![30.0, 10.0, 20.0, 21.0],
            PointOrigin::HighTemperature,
        )
        .unwrap();
        assert_eq!(p.time.to_vec(), vec![1.0, 2.0, 2.0, 3.0]);
        // Stable: equal times keep input order.
        assert_eq!(p.inventory.to_vec(), vec![10.0, 20.0, 21.0, 30.0]);
        assert!(SimulationPoint::new(1.0, 1.0, vec![1.0], vec![], PointOrigin::Analytic).is_err());
    }

    #[test]
    fn test_analytic_points_layout() {
        let pts = analytic_points(0.03);
        assert_eq!(pts.len(), 21);
        assert!(pts.iter().all(|p| p.temperature == 320.0 && p.time.len() == 100));
        assert!((pts[0].concentration / 2e22 - 1.0).abs() < 1e-12);
        assert!((pts[6].concentration / 1e23 - 1.0).abs() < 1e-12);
        assert!((pts[14].concentration / 2e20 - 1.0).abs() < 1e-12);

        let p = &pts[3];
        let t = p.time[10];
        let e = (t * 2.0 * 1.326e-10 * p.concentration / 6.93e25).sqrt();
        assert!((p.inventory[10] / (6.93e25 * e * 0.03) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_extends_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let db = SimulationDatabase::load(&DataPaths::new(dir.path()), &DatabaseConfig::default())
            .unwrap();
        assert_eq!(db.len(), 16 + 8 + 21);
        assert_eq!(db.points()[0].origin, PointOrigin::HighTemperature);
        assert_eq!(db.points()[16].origin, PointOrigin::LowTemperature);
        assert_eq!(db.points()[24].origin, PointOrigin::Analytic);

        for p in db.points() {
            for w in p.time.as_slice().unwrap().windows(2) {
                assert!(w[1] >= w[0], "time must be non-decreasing");
            }
        }

        // High temperature: 100 prepended samples from 1e2 s.
        let high = &db.points()[0];
        assert_eq!(high.time.len(), 130);
        assert!((high.time[0] - 1e2).abs() < 1e-9);
        // Low temperature: 100 appended samples up to 1e7 s.
        let low = &db.points()[16];
        assert_eq!(low.time.len(), 130);
        assert!((low.time[129] / 1e7 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inventory_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let db = SimulationDatabase::load(&DataPaths::new(dir.path()), &DatabaseConfig::default())
            .unwrap();

        // Inventory = factor * (0.5 + 0.3 + 0.2) * k sqrt(t) / factor.
        let p = db.find(700.0, 1e22).unwrap();
        let k = 1e14 * 100f64.powf(0.8) * (700.0 / 400.0);
        let v = db.inventory_at(700.0, 1e22, 1e6).unwrap();
        assert!((v / (k * 1e6f64.sqrt()) - 1.0).abs() < 1e-2, "v = {v}");
        // Extrapolated early times follow the same sqrt law.
        let early = p.inventory_at(1e3).unwrap();
        assert!((early / (k * 1e3f64.sqrt()) - 1.0).abs() < 1e-2, "early = {early}");

        assert!(matches!(
            db.inventory_at(650.0, 1e22, 1e6),
            Err(RetentionError::PointNotFound { .. })
        ));
        assert!(matches!(
            db.inventory_at(700.0, 1e22, 1e9),
            Err(RetentionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = SimulationDatabase::load(&DataPaths::new(dir.path()), &DatabaseConfig::default())
            .unwrap_err();
        assert!(matches!(err, RetentionError::DatasetMissing(_)));
    }

    #[test]
    fn test_data_paths_layout() {
        let paths = DataPaths::new("/data/divh");
        assert_eq!(
            paths.reflection_table(),
            PathBuf::from("/data/divh/data_TRIM_energy_angle.csv")
        );
        assert_eq!(paths.high_temp_dir(), PathBuf::from("/data/divh/mb_high_temp"));
        assert_eq!(paths.low_temp_dir(), PathBuf::from("/data/divh/mb_low_temp"));
    }
}
