// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Property-Based Tests (proptest) for divh-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for divh-types using proptest.
//!
//! Covers: configuration serialization roundtrip and validation,
//! format tag parsing.

use divh_types::config::RetentionConfig;
use divh_types::state::ExpositionFormat;
use proptest::prelude::*;

// ── Configuration Invariants ─────────────────────────────────────────

proptest! {
    /// Any valid configuration survives a JSON roundtrip unchanged.
    #[test]
    fn config_json_roundtrip(
        stride in 1usize..32,
        t_lo in 200.0f64..600.0,
        t_span in 1.0f64..1000.0,
        seed in any::<u64>(),
        n_starts in 1usize..16,
    ) {
        let mut cfg = RetentionConfig::default();
        cfg.inventory.training_stride = stride;
        cfg.inventory.temperature_window = [t_lo, t_lo + t_span];
        cfg.gp.seed = seed;
        cfg.gp.n_starts = n_starts;
        prop_assert!(cfg.validate().is_ok());

        let json = serde_json::to_string(&cfg).unwrap();
        let back: RetentionConfig = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, cfg);
    }

    /// Non-positive concentration windows are always rejected.
    #[test]
    fn config_rejects_non_positive_concentration(lo in -1e22f64..=0.0) {
        let mut cfg = RetentionConfig::default();
        cfg.inventory.concentration_window = [lo, 1e23];
        prop_assert!(cfg.validate().is_err());
    }
}

// ── Format Tags ──────────────────────────────────────────────────────

proptest! {
    /// Only the two exact tags parse.
    #[test]
    fn format_tag_parsing(tag in "[A-Za-z]{0,6}") {
        let parsed = tag.parse::<ExpositionFormat>();
        let known = tag == "ITER" || tag == "WEST";
        prop_assert_eq!(parsed.is_ok(), known);
    }
}
