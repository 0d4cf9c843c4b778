//! Core types and service wiring for the pfandli recycling-point finder.

/// Joining point and machine records into denormalized recycling points.
pub mod aggregate;
/// Busy-state tracking for in-flight operations.
pub mod busy;
/// Classification gate interpreting oracle output.
pub mod gate;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Traits describing the external collaborator interfaces.
pub mod ports;
/// Pure derivation of display attributes from domain state.
pub mod present;
/// Keyed marker reconciliation for the map and list surfaces.
pub mod reconcile;
/// High-level service facade used by clients.
pub mod service;

pub use aggregate::*;
pub use busy::*;
pub use gate::*;
pub use model::*;
pub use ports::*;
pub use present::*;
pub use reconcile::*;
pub use service::*;
