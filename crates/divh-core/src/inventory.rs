// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Inventory Surrogate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Retained inventory as a function of surface temperature and
//! concentration, one surrogate per exposure time.
//!
//! The regression runs on `(T, log10 c) -> log10 inventory`, so the
//! reported stdev is in log10 units. Fitted models are cached by the exact
//! bit pattern of the exposure time; concurrent callers asking for the
//! same unseen time wait for a single fit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use divh_ml::surrogate::{Prediction, RegressionMethod, Surrogate};
use divh_types::config::InventoryConfig;
use divh_types::error::{ensure_len, RetentionError, RetentionResult};
use ndarray::{Array1, Array2};
use tracing::{debug, info, instrument};

use crate::database::SimulationDatabase;

fn check_time(time: f64) -> RetentionResult<()> {
    if !time.is_finite() || time <= 0.0 {
        return Err(RetentionError::DomainError(format!(
            "Exposure time must be finite and > 0 s, got {time}"
        )));
    }
    Ok(())
}

/// Regression inputs `(T, log10 c)` and targets `log10 inventory` at `time`.
///
/// Points outside the validity window are dropped, then every
/// `training_stride`-th remaining point is kept, starting with the first.
pub fn training_set(
    database: &SimulationDatabase,
    time: f64,
    config: &InventoryConfig,
) -> RetentionResult<(Array2<f64>, Array1<f64>)> {
    check_time(time)?;
    if config.training_stride == 0 {
        return Err(RetentionError::ConfigError(
            "inventory.training_stride must be >= 1".to_string(),
        ));
    }
    let [t_min, t_max] = config.temperature_window;
    let [c_min, c_max] = config.concentration_window;

    let mut features = Vec::new();
    let mut targets = Vec::new();
    for p in database
        .points()
        .iter()
        .filter(|p| {
            (t_min..=t_max).contains(&p.temperature) && (c_min..=c_max).contains(&p.concentration)
        })
        .step_by(config.training_stride)
    {
        let inventory = database.inventory_at(p.temperature, p.concentration, time)?;
        if !(inventory > 0.0) {
            return Err(RetentionError::DomainError(format!(
                "Inventory at T={} K, c={} m^-3, t={time} s is {inventory}; log10 undefined",
                p.temperature, p.concentration
            )));
        }
        features.push([p.temperature, p.concentration.log10()]);
        targets.push(inventory.log10());
    }

    let x = Array2::from_shape_fn((features.len(), 2), |(i, j)| features[i][j]);
    Ok((x, Array1::from_vec(targets)))
}

/// Inventory surrogate for one exposure time.
#[derive(Debug)]
pub struct InventoryModel {
    time: f64,
    surrogate: Box<dyn Surrogate>,
    n_training: usize,
}

impl InventoryModel {
    #[instrument(skip(database, config, method))]
    pub fn fit(
        database: &SimulationDatabase,
        time: f64,
        config: &InventoryConfig,
        method: &dyn RegressionMethod,
    ) -> RetentionResult<Self> {
        let (x, y) = training_set(database, time, config)?;
        let surrogate = method.fit(&x, &y)?;
        info!(samples = y.len(), "Inventory surrogate trained");
        Ok(InventoryModel {
            time,
            surrogate,
            n_training: y.len(),
        })
    }

    /// Exposure time (s) this model was trained for.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn n_training(&self) -> usize {
        self.n_training
    }

    /// Inventory (H/m) and its stdev in log10 units at `(T, c)`.
    ///
    /// Zero concentration means no hydrogen and yields `(0, 0)`. A NaN
    /// input (a blank cell upstream) yields NaN for this sample only.
    pub fn predict(&self, temperature: f64, concentration: f64) -> RetentionResult<Prediction> {
        if temperature.is_nan() || concentration.is_nan() {
            return Ok(Prediction {
                mean: f64::NAN,
                stdev: f64::NAN,
            });
        }
        if concentration.is_infinite() || concentration < 0.0 {
            return Err(RetentionError::DomainError(format!(
                "Surface concentration must be finite and >= 0, got {concentration}"
            )));
        }
        if concentration == 0.0 {
            return Ok(Prediction {
                mean: 0.0,
                stdev: 0.0,
            });
        }
        let p = self
            .surrogate
            .predict(&[temperature, concentration.log10()])?;
        Ok(Prediction {
            mean: 10f64.powf(p.mean),
            stdev: p.stdev,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

type Slot = Arc<Mutex<Option<Arc<InventoryModel>>>>;

/// Exposure time -> fitted inventory model.
///
/// Entries are never evicted; [`InventoryModelCache::clear`] drops them all.
#[derive(Debug, Default)]
pub struct InventoryModelCache {
    slots: Mutex<HashMap<u64, Slot>>,
    fits: AtomicUsize,
}

impl InventoryModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached model for `time`, fitting it with `fit` on a miss.
    ///
    /// Only one caller fits a given key; others block on its slot and reuse
    /// the result. A failed fit leaves the key empty for a later retry.
    ///
    /// The slot lock is held while `fit` runs. `fit` must not request the
    /// same `time` from this cache, directly or from a task it spawns on
    /// its own rayon pool, or that request deadlocks.
    pub fn get_or_fit<F>(&self, time: f64, fit: F) -> RetentionResult<Arc<InventoryModel>>
    where
        F: FnOnce() -> RetentionResult<InventoryModel>,
    {
        let slot = Arc::clone(lock(&self.slots).entry(time.to_bits()).or_default());
        let mut entry = lock(&slot);
        if let Some(model) = entry.as_ref() {
            debug!(time, "Inventory model cache hit");
            return Ok(Arc::clone(model));
        }
        debug!(time, "Inventory model cache miss");
        let model = Arc::new(fit()?);
        self.fits.fetch_add(1, Ordering::SeqCst);
        *entry = Some(Arc::clone(&model));
        Ok(model)
    }

    pub fn get(&self, time: f64) -> Option<Arc<InventoryModel>> {
        let slot = lock(&self.slots).get(&time.to_bits()).cloned()?;
        let entry = lock(&slot);
        entry.clone()
    }

    pub fn contains(&self, time: f64) -> bool {
        self.get(time).is_some()
    }

    /// Number of fitted models.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock(slot.as_ref()).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Successful fits performed since construction.
    pub fn fit_count(&self) -> usize {
        self.fits.load(Ordering::SeqCst)
    }

    /// Drop every fitted model.
    ///
    /// Slots are emptied in place, so a fit in flight finishes first and
    /// its result is discarded; the key is never fitted twice at once.
    pub fn clear(&self) {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        for slot in slots {
            *lock(&slot) = None;
        }
    }
}

/// Inventory surrogates over one simulation database, memoised per time.
#[derive(Debug, Clone)]
pub struct InventoryEstimator {
    database: Arc<SimulationDatabase>,
    config: InventoryConfig,
    method: Arc<dyn RegressionMethod>,
    cache: Arc<InventoryModelCache>,
}

impl InventoryEstimator {
    pub fn new(
        database: Arc<SimulationDatabase>,
        config: InventoryConfig,
        method: Arc<dyn RegressionMethod>,
        cache: Arc<InventoryModelCache>,
    ) -> Self {
        InventoryEstimator {
            database,
            config,
            method,
            cache,
        }
    }

    pub fn database(&self) -> &SimulationDatabase {
        &self.database
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn cache(&self) -> &InventoryModelCache {
        &self.cache
    }

    /// Model for `time`, trained on first use.
    pub fn model(&self, time: f64) -> RetentionResult<Arc<InventoryModel>> {
        check_time(time)?;
        self.cache.get_or_fit(time, || {
            InventoryModel::fit(&self.database, time, &self.config, self.method.as_ref())
        })
    }

    /// Inventory (H/m) and log10 stdev for each `(T, c)` pair at `time`.
    ///
    /// Inputs are slices; a bare scalar does not type-check:
    ///
    /// ```compile_fail
    /// # use divh_core::inventory::InventoryEstimator;
    /// # fn check(estimator: &InventoryEstimator) {
    /// let _ = estimator.compute_inventory(600.0, 1e21, 1e7);
    /// # }
    /// ```
    pub fn compute_inventory(
        &self,
        temperature: &[f64],
        concentration: &[f64],
        time: f64,
    ) -> RetentionResult<(Array1<f64>, Array1<f64>)> {
        ensure_len("concentration", temperature.len(), concentration.len())?;
        let model = self.model(time)?;
        let mut inventory = Array1::zeros(temperature.len());
        let mut stdev = Array1::zeros(temperature.len());
        for (i, (t, c)) in temperature.iter().zip(concentration.iter()).enumerate() {
            let p = model.predict(*t, *c)?;
            inventory[i] = p.mean;
            stdev[i] = p.stdev;
        }
        Ok((inventory, stdev))
    }
}
