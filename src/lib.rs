//! A four-tier supply chain game that makes the bullwhip effect visible.
//!
//! The human runs either the Manufacturer or the Distributor; the other tier
//! follows an order-up-to heuristic, the Vendor is an unlimited source and the
//! End User produces scripted demand. [`simulation::engine::ChainSimulation`]
//! steps the chain one cycle at a time, and [`simulation::session::GameSession`]
//! wraps it in the playable phase flow.

pub mod analysis;
pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::GameError;
pub use model::agent::{NodeState, Role};
pub use model::state::{AnalysisStatus, CycleSnapshot, GameState, Nodes};
pub use simulation::config::SimulationConfig;
pub use simulation::engine::ChainSimulation;
pub use simulation::session::{GamePhase, GameSession};
