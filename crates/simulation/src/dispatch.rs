//! Dispatch schedule: which routes spawn a vehicle at which simulated second.
//!
//! Each route's allocation is spread across the horizon by partitioning
//! `[0, horizon)` into windows of its dispatch frequency and drawing one
//! spawn second uniformly inside each window. This avoids bursting a route's
//! whole allocation at once while staying reproducible under a seeded RNG.

use std::collections::BTreeMap;

use bevy::prelude::*;
use rand::Rng;

use crate::allocation::RoutePlan;
use crate::network::RouteId;

/// What the scheduler needs to know about one route.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEntry {
    pub route_id: RouteId,
    pub allocated: u32,
    pub frequency_seconds: f64,
}

impl DispatchEntry {
    pub fn from_plan(plan: &RoutePlan) -> Self {
        Self {
            route_id: plan.route_id,
            allocated: plan.buses_allocated,
            frequency_seconds: plan.frequency_seconds,
        }
    }
}

/// Immutable mapping from simulated second to the routes spawning then.
/// Built once per run; multiple routes may share a second.
#[derive(Debug, Clone, Default)]
pub struct DispatchSchedule {
    by_second: BTreeMap<u32, Vec<RouteId>>,
}

impl DispatchSchedule {
    /// Routes that must spawn a vehicle at `second`.
    pub fn routes_at(&self, second: u32) -> &[RouteId] {
        self.by_second.get(&second).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove and return the routes spawning at `second`. Consuming the
    /// entry guarantees a second is never spawned twice, even if the clock
    /// re-evaluates it.
    pub fn take_at(&mut self, second: u32) -> Vec<RouteId> {
        self.by_second.remove(&second).unwrap_or_default()
    }

    /// Total spawns across the whole run.
    pub fn total_spawns(&self) -> usize {
        self.by_second.values().map(Vec::len).sum()
    }

    /// Spawns scheduled for one route.
    pub fn spawns_for(&self, route_id: RouteId) -> usize {
        self.by_second
            .values()
            .flatten()
            .filter(|&&r| r == route_id)
            .count()
    }

    /// Seconds that have at least one spawn, ascending.
    pub fn seconds(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_second.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_second.is_empty()
    }
}

/// Build the schedule for one run.
///
/// Per route: usable windows = `floor(horizon / frequency)`; the scheduled
/// count is `min(allocated, usable)` — allocation beyond the available
/// windows is dropped rather than doubled up into a window. Each used
/// window's end is clipped to the horizon and one second is drawn uniformly
/// from `[start, clipped_end)`; a window left empty by clipping is skipped.
pub fn build_schedule(
    entries: &[DispatchEntry],
    horizon_seconds: u32,
    rng: &mut impl Rng,
) -> DispatchSchedule {
    let mut schedule = DispatchSchedule::default();
    let horizon = horizon_seconds as f64;
    for entry in entries {
        if entry.frequency_seconds <= 0.0 || !entry.frequency_seconds.is_finite() {
            warn!(
                "route {}: invalid dispatch frequency {}, skipping",
                entry.route_id, entry.frequency_seconds
            );
            continue;
        }
        let usable_windows = (horizon / entry.frequency_seconds).floor() as u32;
        let scheduled = entry.allocated.min(usable_windows);
        for window in 0..scheduled {
            let start = window as f64 * entry.frequency_seconds;
            let end = (start + entry.frequency_seconds).min(horizon);
            if end <= start {
                continue;
            }
            let second = rng.gen_range(start..end) as u32;
            schedule
                .by_second
                .entry(second)
                .or_default()
                .push(entry.route_id);
        }
    }
    schedule
}
