//! Tunable constants for the dispatch simulation.

/// Wall-clock milliseconds to traverse one edge. Every segment takes the
/// same duration regardless of its drawn length.
pub const SEGMENT_TRAVEL_MS: f64 = 2000.0;

/// Dwell at an intermediate stop, in milliseconds.
pub const STOP_DWELL_MS: f64 = 1000.0;

/// Dwell at the terminal stop (passengers alighting), in milliseconds.
pub const FINAL_DWELL_MS: f64 = 2000.0;

/// Interval of the logical simulation clock: one simulated second per tick.
pub const LOGICAL_TICK_SECONDS: f64 = 1.0;

/// Number of parallel render lanes vehicles are spread across.
pub const LANE_COUNT: u32 = 4;

/// Width of one render lane in world units.
pub const LANE_WIDTH: f32 = 6.0;

/// Passenger capacity per bus.
pub const BUS_CAPACITY: f64 = 20.0;

/// Minimum allowed dispatch interval in seconds.
pub const MIN_FREQUENCY_SEC: f64 = 10.0;

/// Hard cap on buses allocated to a single route.
pub const MAX_BUSES_PER_ROUTE: u32 = 50;

/// Penalty per bus in the allocation objective; higher means fewer buses.
pub const PENALTY_PER_BUS: f64 = 8.0;
