// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Bounded Simplex Optimiser
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Derivative-free Nelder-Mead minimisation inside a box.
//!
//! Trial points are projected onto the box, so the objective is never
//! evaluated outside `bounds`. Non-finite objective values count as `+inf`.

use divh_types::error::{RetentionError, RetentionResult};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SimplexConfig {
    pub max_iterations: usize,
    /// Stop when the objective spread across the simplex falls below this.
    pub tolerance: f64,
    /// Initial simplex edge as a fraction of each bound width.
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            tolerance: 1e-8,
            initial_step: 0.15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimplexResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

fn project(x: &mut [f64], bounds: &[(f64, f64)]) {
    for (v, (lo, hi)) in x.iter_mut().zip(bounds.iter()) {
        *v = v.clamp(*lo, *hi);
    }
}

fn eval<F: FnMut(&[f64]) -> f64>(f: &mut F, x: &[f64]) -> f64 {
    let v = f(x);
    if v.is_finite() {
        v
    } else {
        f64::INFINITY
    }
}

/// Minimise `f` starting from `x0` within `bounds`.
pub fn minimize_bounded<F>(
    mut f: F,
    x0: &[f64],
    bounds: &[(f64, f64)],
    config: &SimplexConfig,
) -> RetentionResult<SimplexResult>
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x0.len();
    if n == 0 || bounds.len() != n {
        return Err(RetentionError::ConfigError(format!(
            "Simplex requires matching non-empty start and bounds, got {} and {}",
            n,
            bounds.len()
        )));
    }
    if bounds
        .iter()
        .any(|(lo, hi)| !lo.is_finite() || !hi.is_finite() || lo > hi)
    {
        return Err(RetentionError::ConfigError(
            "Simplex bounds must be finite with lower <= upper".to_string(),
        ));
    }
    if config.max_iterations == 0 || !(config.tolerance > 0.0) {
        return Err(RetentionError::ConfigError(
            "Simplex requires max_iterations >= 1 and tolerance > 0".to_string(),
        ));
    }

    let mut start = x0.to_vec();
    project(&mut start, bounds);

    // Initial simplex: step along each axis, flipped when it would leave the box.
    let mut vertices: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    vertices.push(start.clone());
    for d in 0..n {
        let (lo, hi) = bounds[d];
        let step = (config.initial_step * (hi - lo)).max(1e-8);
        let mut v = start.clone();
        v[d] = if v[d] + step <= hi { v[d] + step } else { v[d] - step };
        project(&mut v, bounds);
        vertices.push(v);
    }
    let mut values: Vec<f64> = vertices.iter().map(|v| eval(&mut f, v)).collect();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.max_iterations {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
        vertices = order.iter().map(|&i| vertices[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let spread = values[n] - values[0];
        if values[0].is_finite() && spread.abs() < config.tolerance {
            converged = true;
            break;
        }

        let mut centroid = vec![0.0; n];
        for v in vertices.iter().take(n) {
            for d in 0..n {
                centroid[d] += v[d] / n as f64;
            }
        }
        let along = |coef: f64| -> Vec<f64> {
            let mut p: Vec<f64> = (0..n)
                .map(|d| centroid[d] + coef * (vertices[n][d] - centroid[d]))
                .collect();
            project(&mut p, bounds);
            p
        };

        let reflected = along(-REFLECT);
        let f_reflected = eval(&mut f, &reflected);

        if f_reflected < values[0] {
            let expanded = along(-EXPAND);
            let f_expanded = eval(&mut f, &expanded);
            if f_expanded < f_reflected {
                vertices[n] = expanded;
                values[n] = f_expanded;
            } else {
                vertices[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }
        if f_reflected < values[n - 1] {
            vertices[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        let contracted = if f_reflected < values[n] {
            along(-CONTRACT)
        } else {
            along(CONTRACT)
        };
        let f_contracted = eval(&mut f, &contracted);
        if f_contracted < values[n].min(f_reflected) {
            vertices[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        let best = vertices[0].clone();
        for i in 1..=n {
            let mut p: Vec<f64> = (0..n)
                .map(|d| best[d] + SHRINK * (vertices[i][d] - best[d]))
                .collect();
            project(&mut p, bounds);
            values[i] = eval(&mut f, &p);
            vertices[i] = p;
        }
    }

    let best = (0..=n)
        .min_by(|&i, &j| values[i].total_cmp(&values[j]))
        .unwrap_or(0);
    Ok(SimplexResult {
        x: vertices[best].clone(),
        value: values[best],
        iterations,
        converged,
    })
}
