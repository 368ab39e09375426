//! Fluid property errors.

use dn_core::DnError;
use thiserror::Error;

pub type FluidResult<T> = Result<T, FluidError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, conductivity, etc.).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Outside the range the correlations were fitted for.
    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },
}

impl From<FluidError> for DnError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what, .. } => DnError::Invariant { what },
            FluidError::OutOfRange { what, .. } => DnError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical {
            what: "density",
            value: -1.0,
        };
        assert!(err.to_string().contains("density"));
    }

    #[test]
    fn error_to_dn_error() {
        let err: DnError = FluidError::OutOfRange {
            what: "water temperature",
            value: 500.0,
        }
        .into();
        assert!(matches!(err, DnError::InvalidArg { .. }));
    }
}
