//! Session services - bridge the pure domain with persistence and broadcast.

pub mod coordinator;
pub mod session;

pub use coordinator::GameSessionCoordinator;
pub use session::{RoundPhase, SessionDeps, SessionHandle, SessionStrategies};
