//! Vehicle fleet: dispatch-driven spawning, the per-vehicle state machine
//! and live per-route telemetry.
//!
//! ## Data model
//! - `Vehicle`: one entity progressing along a route's copied stop sequence
//! - `FleetState`: top-level resource owning vehicles, schedule and telemetry
//! - `RouteTelemetry`: active / completed counters per route
//!
//! ## Cadences
//! The logical clock (`FixedUpdate`, 1 Hz) is the only trigger for spawning;
//! the render tick (`Update`) is the only driver of interpolation. See
//! [`crate::clock`].

pub mod state;
pub mod systems;
mod tests;
pub mod types;

pub use state::FleetState;
pub use systems::*;
pub use types::*;
