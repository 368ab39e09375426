//! dn-graph: topology layer for district networks.
//!
//! Provides:
//! - Node/edge records with roles (plant, consumer, junction)
//! - Incremental network builder with validation
//! - Signed incidence matrix with a per-timestep orientation overlay
//! - Fundamental loop basis for meshed networks
//!
//! # Example
//!
//! ```
//! use dn_graph::{NetworkBuilder, NodeRole};
//!
//! let mut builder = NetworkBuilder::new();
//! let plant = builder.add_node("PLANT", NodeRole::Plant);
//! let house = builder.add_consumer("N1", "B001");
//! builder.add_pipe("PIPE0", plant, house, 100.0);
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.nodes().len(), 2);
//! assert!(network.loops().is_empty());
//! ```

pub mod builder;
pub mod error;
pub mod incidence;
pub mod loops;
pub mod network;
pub mod orientation;
pub(crate) mod validate;

pub use builder::NetworkBuilder;
pub use error::{GraphError, GraphResult};
pub use incidence::IncidenceMatrix;
pub use loops::{Loop, LoopBasis};
pub use network::{Edge, Network, Node, NodeRole};
pub use orientation::{Orientation, orient_from_virtual_demand};
