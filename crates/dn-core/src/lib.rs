//! dn-core: shared foundation for the district network solver.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real, tolerances, rounding and optional-value helpers)
//! - ids (compact node/edge identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{DnError, DnResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
