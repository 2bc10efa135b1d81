// ─────────────────────────────────────────────────────────────────────
// DivH Retention — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RetentionError;

/// Hydrogen isotope carried by the incident particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Isotope {
    #[default]
    H,
    D,
    T,
}

impl Isotope {
    /// Multiplicative factor on the H diffusivity (classical 1/sqrt(mass) scaling).
    pub fn diffusivity_scaling(self) -> f64 {
        match self {
            Isotope::H => 1.0,
            Isotope::D => 1.0 / 2f64.sqrt(),
            Isotope::T => 1.0 / 3f64.sqrt(),
        }
    }
}

impl FromStr for Isotope {
    type Err = RetentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "H" => Ok(Isotope::H),
            "D" => Ok(Isotope::D),
            "T" => Ok(Isotope::T),
            other => Err(RetentionError::DomainError(format!(
                "Unknown isotope '{other}' (expected H, D or T)"
            ))),
        }
    }
}

/// Input file schema of an exposure case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpositionFormat {
    /// SOLPS-ITER export: `,`-delimited, angles not provided.
    Iter,
    /// SOLEDGE WEST export: `;`-delimited, angles provided.
    West,
}

impl ExpositionFormat {
    pub fn delimiter(self) -> char {
        match self {
            ExpositionFormat::Iter => ',',
            ExpositionFormat::West => ';',
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ExpositionFormat::Iter => "ITER",
            ExpositionFormat::West => "WEST",
        }
    }
}

impl fmt::Display for ExpositionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ExpositionFormat {
    type Err = RetentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ITER" => Ok(ExpositionFormat::Iter),
            "WEST" => Ok(ExpositionFormat::West),
            other => Err(RetentionError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isotope_scaling() {
        assert_eq!(Isotope::H.diffusivity_scaling(), 1.0);
        assert!((Isotope::D.diffusivity_scaling() * 2f64.sqrt() - 1.0).abs() < 1e-15);
        assert!((Isotope::T.diffusivity_scaling() * 3f64.sqrt() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_isotope_parse() {
        assert_eq!("D".parse::<Isotope>().unwrap(), Isotope::D);
        assert!("He".parse::<Isotope>().is_err());
    }

    #[test]
    fn test_format_tags_roundtrip() {
        for format in [ExpositionFormat::Iter, ExpositionFormat::West] {
            assert_eq!(format.tag().parse::<ExpositionFormat>().unwrap(), format);
        }
        assert_eq!(ExpositionFormat::Iter.delimiter(), ',');
        assert_eq!(ExpositionFormat::West.delimiter(), ';');
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = "JET".parse::<ExpositionFormat>().unwrap_err();
        assert!(matches!(err, RetentionError::UnknownFormat(tag) if tag == "JET"));
        // Tags are case sensitive.
        assert!("iter".parse::<ExpositionFormat>().is_err());
    }
}
