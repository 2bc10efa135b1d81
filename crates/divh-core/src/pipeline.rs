// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Retention Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Exposition -> surface temperature -> surface concentration -> inventory.

use std::path::Path;
use std::sync::Arc;

use divh_ml::gp::GpRegression;
use divh_ml::surrogate::RegressionMethod;
use divh_types::config::RetentionConfig;
use divh_types::error::RetentionResult;
use divh_types::state::Isotope;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::concentration::compute_surface_concentration_breakdown;
use crate::database::{DataPaths, SimulationDatabase};
use crate::exposition::Exposition;
use crate::implantation::ReflectionModel;
use crate::inventory::{InventoryEstimator, InventoryModelCache};
use crate::map::{InventoryMap, MapGrid};
use crate::output::{ExpositionOutput, InventoryProfile, Stage};
use crate::thermal::surface_temperatures;

/// Per-run choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    #[serde(default)]
    pub isotope: Isotope,
    /// Stop after the concentration stage when false
    #[serde(default = "default_true")]
    pub inventory: bool,
    /// Exposure time (s); `inventory.default_time` when absent
    #[serde(default)]
    pub time: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            isotope: Isotope::H,
            inventory: true,
            time: None,
        }
    }
}

/// Trained transport surrogates plus the inventory estimator.
#[derive(Debug)]
pub struct RetentionPipeline {
    config: RetentionConfig,
    reflection: ReflectionModel,
    estimator: InventoryEstimator,
}

impl RetentionPipeline {
    /// Load the datasets under `paths` and train the reflection surrogate.
    ///
    /// Inventory models are trained lazily and stored in `cache`. `method`
    /// replaces GP regression, so `config.gp` is only validated here.
    #[instrument(skip_all, fields(root = %paths.root().display()))]
    pub fn new(
        paths: &DataPaths,
        config: RetentionConfig,
        method: Arc<dyn RegressionMethod>,
        cache: Arc<InventoryModelCache>,
    ) -> RetentionResult<Self> {
        config.validate()?;
        let reflection =
            ReflectionModel::from_table(&paths.reflection_table(), &config.reflection, method.as_ref())?;
        let database = Arc::new(SimulationDatabase::load(paths, &config.database)?);
        let estimator = InventoryEstimator::new(database, config.inventory.clone(), method, cache);
        info!("Retention pipeline ready");
        Ok(Self::from_parts(config, reflection, estimator))
    }

    /// [`RetentionPipeline::new`] with GP regression configured by `config.gp`.
    pub fn with_gp(
        paths: &DataPaths,
        config: RetentionConfig,
        cache: Arc<InventoryModelCache>,
    ) -> RetentionResult<Self> {
        let method = Arc::new(GpRegression::new(config.gp.clone()));
        Self::new(paths, config, method, cache)
    }

    pub fn from_parts(
        config: RetentionConfig,
        reflection: ReflectionModel,
        estimator: InventoryEstimator,
    ) -> Self {
        RetentionPipeline {
            config,
            reflection,
            estimator,
        }
    }

    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    pub fn reflection(&self) -> &ReflectionModel {
        &self.reflection
    }

    pub fn estimator(&self) -> &InventoryEstimator {
        &self.estimator
    }

    fn resolve_time(&self, time: Option<f64>) -> f64 {
        time.unwrap_or(self.config.inventory.default_time)
    }

    #[instrument(skip_all, fields(format = %exposition.format, samples = exposition.len()))]
    pub fn process_exposition(
        &self,
        exposition: &Exposition,
        options: &ProcessOptions,
    ) -> RetentionResult<ExpositionOutput> {
        debug!(stage = ?Stage::Raw, "Exposition loaded");

        let temperature = surface_temperatures(exposition.net_heat_flux.as_slice().unwrap_or(&[]));
        debug!(stage = ?Stage::TemperatureComputed, "Surface temperature");

        let concentration = compute_surface_concentration_breakdown(
            &self.reflection,
            &exposition.surface_conditions(temperature.as_slice().unwrap_or(&[])),
            options.isotope,
        )?;
        debug!(stage = ?Stage::ConcentrationComputed, isotope = ?options.isotope, "Surface concentration");

        let inventory = if options.inventory {
            let time = self.resolve_time(options.time);
            let (inventory, stdev) = self.estimator.compute_inventory(
                temperature.as_slice().unwrap_or(&[]),
                concentration.total.as_slice().unwrap_or(&[]),
                time,
            )?;
            debug!(stage = ?Stage::InventoryComputed, time, "Inventory");
            Some(InventoryProfile {
                time,
                inventory,
                stdev,
            })
        } else {
            None
        };

        Ok(ExpositionOutput {
            format: exposition.format,
            isotope: options.isotope,
            arc_length: exposition.arc_length.clone(),
            temperature,
            concentration,
            inventory,
        })
    }

    /// Read `path` with the schema named by `tag` and run every stage.
    pub fn process_file(
        &self,
        path: &Path,
        tag: &str,
        options: &ProcessOptions,
    ) -> RetentionResult<ExpositionOutput> {
        let exposition = Exposition::from_file_with_tag(path, tag)?;
        self.process_exposition(&exposition, options)
    }

    /// Inventory (H/m) and log10 stdev for explicit `(T, c)` pairs.
    pub fn compute_inventory(
        &self,
        temperature: &[f64],
        concentration: &[f64],
        time: Option<f64>,
    ) -> RetentionResult<(Array1<f64>, Array1<f64>)> {
        self.estimator
            .compute_inventory(temperature, concentration, self.resolve_time(time))
    }

    pub fn inventory_map(&self, time: Option<f64>, grid: &MapGrid) -> RetentionResult<InventoryMap> {
        let model = self.estimator.model(self.resolve_time(time))?;
        InventoryMap::compute(&model, grid)
    }
}
