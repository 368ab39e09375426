//! Error types for component operations.

use dn_core::error::DnError;
use dn_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur during component calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Pipe catalog is empty")]
    EmptyCatalog,

    #[error("Edge '{edge}' specifies pipe '{dn}' which is not in the catalog")]
    CatalogMismatch { edge: String, dn: String },

    #[error("Fluid model error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for DnError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => DnError::Invariant { what },
            ComponentError::InvalidArg { what } => DnError::InvalidArg { what },
            ComponentError::EmptyCatalog => DnError::InvalidArg {
                what: "empty pipe catalog",
            },
            ComponentError::CatalogMismatch { .. } => DnError::InvalidArg {
                what: "pipe not in catalog",
            },
            ComponentError::Fluid(f) => f.into(),
        }
    }
}
