//! Force-directed layout for character interaction graphs.
//!
//! A [`graph::Graph`] of characters and their interactions is handed to a
//! [`sim::Simulation`], which scatters the nodes over a viewport and ticks a
//! spring/charge/center force model on a background thread until it cools.
//! Renderers poll [`sim::Simulation::snapshot`] every frame and feed pointer
//! drags back through `pin`, `drag` and `unpin`.

pub mod analysis;
pub mod error;
pub mod graph;
pub mod sim;
pub mod util;

pub use error::{LayoutError, LayoutResult};
pub use graph::{Graph, Link, Node};
pub use sim::{DriverStatus, Simulation, SimulationConfig, Snapshot};
