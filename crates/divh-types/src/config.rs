// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{RetentionError, RetentionResult};

/// Top-level estimator configuration.
///
/// Every section is optional in JSON; absent fields fall back to the
/// empirically chosen values the inventory database was calibrated with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub reflection: ReflectionConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gp: GpConfig,
}

/// Inventory surrogate training parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Keep every n-th corpus point inside the validity window (default: 6)
    #[serde(default = "default_training_stride")]
    pub training_stride: usize,
    /// Inclusive surface temperature window [K] (default: [320, 1100])
    #[serde(default = "default_temperature_window")]
    pub temperature_window: [f64; 2],
    /// Inclusive surface concentration window [m^-3] (default: [1e20, 1e23])
    #[serde(default = "default_concentration_window")]
    pub concentration_window: [f64; 2],
    /// Exposure time used when the caller gives none [s] (default: 1e7)
    #[serde(default = "default_time")]
    pub default_time: f64,
}

/// Reflection coefficient surrogate parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionConfig {
    /// Keep every n-th row of the energy/angle table (default: 5)
    #[serde(default = "default_table_stride")]
    pub table_stride: usize,
}

/// Simulation database extension parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Geometry factor for the high-temperature corpus (default: 2)
    #[serde(default = "default_high_temp_factor")]
    pub high_temp_factor: f64,
    /// Monoblock thickness used for the low-temperature corpus [m] (default: 0.03)
    #[serde(default = "default_monoblock_thickness")]
    pub monoblock_thickness: f64,
    /// log10 bounds of the synthetic early-time samples [s] (default: [2, 4])
    #[serde(default = "default_early_window")]
    pub early_window_log10: [f64; 2],
    /// log10 bounds of the synthetic late-time samples [s] (default: [5, 7])
    #[serde(default = "default_late_window")]
    pub late_window_log10: [f64; 2],
    /// Number of synthetic samples per extension (default: 100)
    #[serde(default = "default_extension_samples")]
    pub extension_samples: usize,
}

/// Covariance kernel family for GP regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelKind {
    #[default]
    RationalQuadratic,
    SquaredExponential,
}

/// GP hyperparameter optimisation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpConfig {
    #[serde(default)]
    pub kernel: KernelKind,
    /// Number of optimiser starts (centre of bounds + seeded random draws)
    #[serde(default = "default_n_starts")]
    pub n_starts: usize,
    /// Simplex iterations per start
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Simplex convergence tolerance on the objective spread
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Seed of the multi-start sampler; fixes the fitted model
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Diagonal jitter relative to the kernel amplitude squared
    #[serde(default = "default_nugget")]
    pub nugget: f64,
}

fn default_training_stride() -> usize {
    6
}
fn default_temperature_window() -> [f64; 2] {
    [320.0, 1100.0]
}
fn default_concentration_window() -> [f64; 2] {
    [1e20, 1e23]
}
fn default_time() -> f64 {
    crate::constants::DEFAULT_TIME
}
fn default_table_stride() -> usize {
    5
}
fn default_high_temp_factor() -> f64 {
    2.0
}
fn default_monoblock_thickness() -> f64 {
    30e-3
}
fn default_early_window() -> [f64; 2] {
    [2.0, 4.0]
}
fn default_late_window() -> [f64; 2] {
    [5.0, 7.0]
}
fn default_extension_samples() -> usize {
    100
}
fn default_n_starts() -> usize {
    6
}
fn default_max_iterations() -> usize {
    400
}
fn default_tolerance() -> f64 {
    1e-8
}
fn default_seed() -> u64 {
    2021
}
fn default_nugget() -> f64 {
    1e-8
}

impl Default for InventoryConfig {
    fn default() -> Self {
        InventoryConfig {
            training_stride: default_training_stride(),
            temperature_window: default_temperature_window(),
            concentration_window: default_concentration_window(),
            default_time: default_time(),
        }
    }
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        ReflectionConfig {
            table_stride: default_table_stride(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            high_temp_factor: default_high_temp_factor(),
            monoblock_thickness: default_monoblock_thickness(),
            early_window_log10: default_early_window(),
            late_window_log10: default_late_window(),
            extension_samples: default_extension_samples(),
        }
    }
}

impl Default for GpConfig {
    fn default() -> Self {
        GpConfig {
            kernel: KernelKind::default(),
            n_starts: default_n_starts(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: default_seed(),
            nugget: default_nugget(),
        }
    }
}

fn ordered_window(name: &str, window: [f64; 2]) -> RetentionResult<()> {
    if !window[0].is_finite() || !window[1].is_finite() || window[0] > window[1] {
        return Err(RetentionError::ConfigError(format!(
            "{name} must be finite with lower <= upper, got [{}, {}]",
            window[0], window[1]
        )));
    }
    Ok(())
}

impl RetentionConfig {
    /// Load from JSON file and validate.
    pub fn from_file(path: &str) -> RetentionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RetentionResult<()> {
        if self.inventory.training_stride == 0 {
            return Err(RetentionError::ConfigError(
                "inventory.training_stride must be >= 1".to_string(),
            ));
        }
        ordered_window("inventory.temperature_window", self.inventory.temperature_window)?;
        ordered_window(
            "inventory.concentration_window",
            self.inventory.concentration_window,
        )?;
        if self.inventory.concentration_window[0] <= 0.0 {
            return Err(RetentionError::ConfigError(
                "inventory.concentration_window must be strictly positive".to_string(),
            ));
        }
        if !self.inventory.default_time.is_finite() || self.inventory.default_time <= 0.0 {
            return Err(RetentionError::ConfigError(
                "inventory.default_time must be finite and > 0".to_string(),
            ));
        }
        if self.reflection.table_stride == 0 {
            return Err(RetentionError::ConfigError(
                "reflection.table_stride must be >= 1".to_string(),
            ));
        }
        if !(self.database.high_temp_factor > 0.0) || !(self.database.monoblock_thickness > 0.0) {
            return Err(RetentionError::ConfigError(
                "database geometry factors must be > 0".to_string(),
            ));
        }
        ordered_window("database.early_window_log10", self.database.early_window_log10)?;
        ordered_window("database.late_window_log10", self.database.late_window_log10)?;
        if self.database.extension_samples < 2 {
            return Err(RetentionError::ConfigError(
                "database.extension_samples must be >= 2".to_string(),
            ));
        }
        if self.gp.n_starts == 0 || self.gp.max_iterations == 0 {
            return Err(RetentionError::ConfigError(
                "gp.n_starts and gp.max_iterations must be >= 1".to_string(),
            ));
        }
        if !self.gp.tolerance.is_finite() || self.gp.tolerance <= 0.0 {
            return Err(RetentionError::ConfigError(
                "gp.tolerance must be finite and > 0".to_string(),
            ));
        }
        if !self.gp.nugget.is_finite() || self.gp.nugget < 0.0 {
            return Err(RetentionError::ConfigError(
                "gp.nugget must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
