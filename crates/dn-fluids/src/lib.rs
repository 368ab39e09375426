//! dn-fluids: water properties and physical constants for district networks.
//!
//! Provides:
//! - Liquid water correlations (kinematic viscosity, thermal conductivity, Prandtl)
//! - The immutable [`PhysicalConstants`] record passed to every solver call
//!
//! # Example
//!
//! ```
//! use dn_fluids::{PhysicalConstants, water};
//!
//! let consts = PhysicalConstants::default();
//! let pr = water::prandtl(333.15, &consts);
//! assert!(pr > 2.0 && pr < 4.0);
//! ```

pub mod constants;
pub mod error;
pub mod water;

pub use constants::PhysicalConstants;
pub use error::{FluidError, FluidResult};
