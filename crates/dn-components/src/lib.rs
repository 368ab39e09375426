//! dn-components: pipe and substation models for district networks.
//!
//! Provides:
//! - Pipe hydraulics (Reynolds, Darcy friction, Darcy-Weisbach loss)
//! - Pipe heat conduction to the ground and the closed-form outlet temperature
//! - Pipe catalog with flow-based sizing
//! - The `SubstationModel` trait and a constant-ΔT reference substation
//! - Ground temperature from ambient air (Kusuda)
//!
//! All models are deterministic functions of flow, temperature and
//! [`PhysicalConstants`](dn_fluids::PhysicalConstants), suitable for
//! evaluation from parallel timestep tasks.
//!
//! # Example
//!
//! ```
//! use dn_components::{NetworkKind, Pipe, PipeCatalog};
//! use dn_fluids::PhysicalConstants;
//!
//! let consts = PhysicalConstants::default();
//! let catalog = PipeCatalog::standard();
//! let record = catalog.by_dn("DN80").unwrap().clone();
//! let pipe = Pipe::new(100.0, record);
//!
//! let dp = pipe.pressure_loss(5.0, Some(353.0), &consts);
//! let k = pipe.conduction_coefficient(5.0, Some(353.0), NetworkKind::Heating, &consts).unwrap();
//! assert!(dp > 0.0 && k > 0.0);
//! ```

pub mod catalog;
pub mod common;
pub mod error;
pub mod ground;
pub mod hydraulics;
pub mod pipe;
pub mod substation;
pub mod thermal;
pub mod traits;

pub use catalog::{PipeCatalog, PipeRecord, SizingOutcome};
pub use common::NetworkKind;
pub use error::{ComponentError, ComponentResult};
pub use pipe::Pipe;
pub use substation::{BuildingLoad, DeltaTSubstation, HexSpec};
pub use traits::{SubstationModel, SubstationOutput};
