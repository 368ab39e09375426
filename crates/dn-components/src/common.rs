//! Common utilities for component calculations.

use dn_core::numeric::ensure_finite;
use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, ComponentResult};

/// Small epsilon for mass flow rate (kg/s)
pub const EPSILON_MDOT: f64 = 1e-9;

/// Service delivered by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    /// District heating: plants supply hot water, consumers cool it.
    #[default]
    Heating,
    /// District cooling: plants supply chilled water, consumers warm it.
    Cooling,
}

impl NetworkKind {
    /// Short code used in file names and logs.
    pub fn code(self) -> &'static str {
        match self {
            NetworkKind::Heating => "DH",
            NetworkKind::Cooling => "DC",
        }
    }
}

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn kind_codes() {
        assert_eq!(NetworkKind::Heating.code(), "DH");
        assert_eq!(NetworkKind::Cooling.code(), "DC");
        assert_eq!(NetworkKind::default(), NetworkKind::Heating);
    }
}
