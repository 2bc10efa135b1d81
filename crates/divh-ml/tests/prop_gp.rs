// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Property-Based Tests (proptest) for divh-ml
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for divh-ml using proptest.
//!
//! Covers: GP predictive variance, interpolation of training targets,
//! kernel symmetry.

use divh_ml::gp::GpModel;
use divh_ml::kernel::Kernel;
use divh_ml::surrogate::Surrogate;
use divh_types::config::{GpConfig, KernelKind};
use ndarray::{array, Array1, Array2};
use proptest::prelude::*;

fn kernel_kind() -> impl Strategy<Value = KernelKind> {
    prop_oneof![
        Just(KernelKind::RationalQuadratic),
        Just(KernelKind::SquaredExponential)
    ]
}

// ── Kernel Properties ────────────────────────────────────────────────

proptest! {
    /// k(a, b) == k(b, a) and 0 < k(a, b) <= a^2.
    #[test]
    fn kernel_symmetric_and_bounded(
        kind in kernel_kind(),
        amp in 0.1f64..5.0,
        alpha in 0.2f64..50.0,
        l0 in 0.1f64..10.0,
        l1 in 0.1f64..10.0,
        p in prop::array::uniform4(-5.0f64..5.0),
    ) {
        let k = Kernel { kind, amplitude: amp, alpha, length_scales: vec![l0, l1] };
        let a = array![p[0], p[1]];
        let b = array![p[2], p[3]];
        let kab = k.eval(a.view(), b.view());
        let kba = k.eval(b.view(), a.view());
        prop_assert!((kab - kba).abs() < 1e-15 * amp * amp);
        prop_assert!(kab >= 0.0 && kab <= amp * amp * (1.0 + 1e-12));
    }
}

// ── GP Fit Properties ────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Predictive stdev is finite and non-negative; training targets are
    /// reproduced closely at their inputs.
    #[test]
    fn gp_reproduces_training_targets(
        kind in kernel_kind(),
        slope in -2.0f64..2.0,
        curvature in -0.5f64..0.5,
        offset in -10.0f64..10.0,
    ) {
        let n = 9;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f64 * 0.5);
        let y: Array1<f64> = x.column(0).mapv(|v| offset + slope * v + curvature * v * v);
        let cfg = GpConfig { kernel: kind, n_starts: 2, max_iterations: 200, ..Default::default() };
        let model = GpModel::try_fit(&x, &y, &cfg).unwrap();

        for i in 0..n {
            let p = model.predict(&[x[[i, 0]]]).unwrap();
            prop_assert!(p.stdev.is_finite() && p.stdev >= 0.0);
            let scale = 1.0 + y.iter().map(|v| v.abs()).fold(0.0, f64::max);
            prop_assert!((p.mean - y[i]).abs() < 1e-3 * scale,
                "row {}: mean {} vs target {}", i, p.mean, y[i]);
        }
    }
}
