// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Hydrogen retention in W divertor targets.
//!
//! Stage 1: transport coefficients, surface temperature and concentration
//! Stage 2: simulation database and time-indexed inventory surrogates
//! Stage 3: exposition ingestion, pipeline and result export

pub mod concentration;
pub mod database;
pub mod exposition;
pub mod implantation;
pub mod inventory;
pub mod map;
pub mod output;
pub mod pipeline;
pub mod table;
pub mod thermal;

pub use exposition::Exposition;
pub use inventory::{InventoryEstimator, InventoryModel, InventoryModelCache};
pub use output::{ExpositionOutput, InventoryProfile, Stage};
pub use pipeline::{ProcessOptions, RetentionPipeline};
