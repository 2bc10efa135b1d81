// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Interpolation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 1-D linear interpolation and sample spacing helpers.

use divh_types::error::{RetentionError, RetentionResult};
use ndarray::Array1;

/// Linear interpolation of `(x, y)` at `xq`.
///
/// `x` must be sorted ascending. Queries outside `[x[0], x[n-1]]` are an
/// error rather than an extrapolation. Repeated abscissae resolve to the
/// first sample of the run.
pub fn interp1d(x: &[f64], y: &[f64], xq: f64) -> RetentionResult<f64> {
    if x.len() != y.len() {
        return Err(RetentionError::ShapeMismatch {
            name: "interp1d.y".to_string(),
            expected: x.len(),
            got: y.len(),
        });
    }
    let (Some(&x_min), Some(&x_max)) = (x.first(), x.last()) else {
        return Err(RetentionError::OutOfRange {
            value: xq,
            min: f64::NAN,
            max: f64::NAN,
        });
    };
    if !xq.is_finite() || xq < x_min || xq > x_max {
        return Err(RetentionError::OutOfRange {
            value: xq,
            min: x_min,
            max: x_max,
        });
    }

    // First index with x[i] >= xq.
    let hi = x.partition_point(|&v| v < xq);
    if hi == 0 {
        return Ok(y[0]);
    }
    let lo = hi - 1;
    let dx = x[hi] - x[lo];
    if dx <= 0.0 {
        return Ok(y[lo]);
    }
    let t = (xq - x[lo]) / dx;
    Ok(y[lo] + t * (y[hi] - y[lo]))
}

/// `n` evenly spaced samples over `[start, stop]`, endpoints exact.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out = Array1::from_shape_fn(n, |i| start + step * i as f64);
            out[n - 1] = stop;
            out
        }
    }
}

/// `n` samples log-spaced between `10^start_exp` and `10^stop_exp`.
pub fn logspace(start_exp: f64, stop_exp: f64, n: usize) -> Array1<f64> {
    linspace(start_exp, stop_exp, n).mapv(|e| 10f64.powf(e))
}
