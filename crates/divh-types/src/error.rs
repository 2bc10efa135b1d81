// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("Unknown exposition format '{0}' (expected \"ITER\" or \"WEST\")")]
    UnknownFormat(String),

    #[error("Shape mismatch for '{name}': expected {expected} samples, got {got}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Outside physical domain: {0}")]
    DomainError(String),

    #[error("Reference dataset missing: {0}")]
    DatasetMissing(String),

    #[error("Parse error in {source_name} (line {line}): {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("No simulation point at T={temperature} K, c={concentration} m^-3")]
    PointNotFound { temperature: f64, concentration: f64 },

    #[error("Value {value} outside interpolation range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPY export error: {0}")]
    Npy(String),
}

pub type RetentionResult<T> = Result<T, RetentionError>;

/// Fail with [`RetentionError::ShapeMismatch`] when `got` differs from `expected`.
pub fn ensure_len(name: &str, expected: usize, got: usize) -> RetentionResult<()> {
    if expected != got {
        return Err(RetentionError::ShapeMismatch {
            name: name.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}
