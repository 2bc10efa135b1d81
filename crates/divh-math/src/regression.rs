// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Regression
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ordinary least-squares line fits and log-log power laws.

use divh_types::error::{RetentionError, RetentionResult};

/// Least-squares straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
}

/// Power law `y = a * x^b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLaw {
    pub a: f64,
    pub b: f64,
}

impl PowerLaw {
    pub fn eval(&self, x: f64) -> f64 {
        self.a * x.powf(self.b)
    }
}

/// Ordinary least-squares fit of `y` against `x`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> RetentionResult<LinearFit> {
    if x.len() != y.len() {
        return Err(RetentionError::ShapeMismatch {
            name: "linear_regression.y".to_string(),
            expected: x.len(),
            got: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(RetentionError::LinAlg(format!(
            "Linear regression needs at least 2 samples, got {}",
            x.len()
        )));
    }
    if !x.iter().chain(y.iter()).all(|v| v.is_finite()) {
        return Err(RetentionError::LinAlg(
            "Linear regression received non-finite samples".to_string(),
        ));
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx <= 0.0 {
        return Err(RetentionError::LinAlg(
            "Linear regression is degenerate: all x identical".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r_value = if syy > 0.0 {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    Ok(LinearFit {
        slope,
        intercept,
        r_value,
    })
}

/// Fit `y = a * x^b` by linear regression of `log10 y` on `log10 x`.
///
/// Samples with non-positive `x` or `y` have no logarithm and are skipped.
pub fn fit_power_law(x: &[f64], y: &[f64]) -> RetentionResult<PowerLaw> {
    if x.len() != y.len() {
        return Err(RetentionError::ShapeMismatch {
            name: "fit_power_law.y".to_string(),
            expected: x.len(),
            got: y.len(),
        });
    }
    let (log_x, log_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(xi, yi)| **xi > 0.0 && **yi > 0.0)
        .map(|(xi, yi)| (xi.log10(), yi.log10()))
        .unzip();
    let fit = linear_regression(&log_x, &log_y)?;
    Ok(PowerLaw {
        a: 10f64.powf(fit.intercept),
        b: fit.slope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_regression_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 2.5 * v - 1.0).collect();
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope - 2.5).abs() < 1e-12);
        assert!((fit.intercept + 1.0).abs() < 1e-12);
        assert!((fit.r_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_regression_rejects_degenerate() {
        assert!(linear_regression(&[1.0, 1.0], &[0.0, 3.0]).is_err());
        assert!(linear_regression(&[1.0], &[0.0]).is_err());
    }

    #[test]
    fn test_power_law_recovers_parameters() {
        let t: Vec<f64> = (1..=20).map(|i| 1e4 * i as f64).collect();
        let inv: Vec<f64> = t.iter().map(|v| 3.0e17 * v.powf(0.45)).collect();
        let law = fit_power_law(&t, &inv).unwrap();
        assert!((law.b - 0.45).abs() < 1e-10, "b = {}", law.b);
        assert!((law.a / 3.0e17 - 1.0).abs() < 1e-8, "a = {}", law.a);
        assert!((law.eval(1e5) / (3.0e17 * 1e5f64.powf(0.45)) - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_power_law_skips_non_positive_samples() {
        let t = [0.0, 10.0, 100.0, 1000.0];
        let inv = [0.0, 10.0, 100.0, 1000.0];
        let law = fit_power_law(&t, &inv).unwrap();
        assert!((law.b - 1.0).abs() < 1e-12);
        assert!((law.a - 1.0).abs() < 1e-10);
    }
}
