//! Fleet allocation: turns per-stop crowd counts into per-route bus counts
//! and dispatch frequencies.
//!
//! This mirrors the predictor service's logic so a run can be planned
//! locally: aggregate people per route (splitting a junction's crowd across
//! the branches that leave it), guarantee one bus per route, satisfy the
//! capacity minimum, then greedily spend the remaining fleet where an extra
//! bus buys the largest reduction in people-weighted waiting time. Buses
//! with no positive marginal gain stay in the depot as `saved_buses`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{BUS_CAPACITY, MAX_BUSES_PER_ROUTE, MIN_FREQUENCY_SEC, PENALTY_PER_BUS};
use crate::network::{Network, RouteId, StopId};

/// Per-route allocation result. Matches the predictor response shape; the
/// legacy payload called the frequency field `frequency_minutes` even though
/// it was always seconds, so that name is accepted as an alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    pub route_id: RouteId,
    pub route_name: String,
    pub total_people: f64,
    /// Share of all counted people on this route, in percent.
    pub probability: f64,
    pub buses_allocated: u32,
    #[serde(alias = "frequency_minutes")]
    pub frequency_seconds: f64,
}

/// A complete allocation for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetPlan {
    pub routes: Vec<RoutePlan>,
    /// Buses left in the depot because adding them bought nothing.
    pub saved_buses: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("fleet of {provided} buses cannot cover {required} routes (minimum 1 bus each)")]
    FleetTooSmall { required: u32, provided: u32 },
}

/// Average waiting time per passenger on a route, in seconds.
///
/// Half the effective dispatch interval, floored at `MIN_FREQUENCY_SEC`;
/// infinite when the route has no buses.
pub fn avg_wait_for_route(cycle_sec: f64, buses_allocated: u32) -> f64 {
    if buses_allocated == 0 {
        return f64::INFINITY;
    }
    let raw_freq = if cycle_sec > 0.0 {
        cycle_sec / buses_allocated as f64
    } else {
        f64::INFINITY
    };
    raw_freq.max(MIN_FREQUENCY_SEC) / 2.0
}

/// Allocation objective: total people-weighted wait plus a per-bus penalty.
/// Lower is better. Routes with no counted people contribute nothing.
pub fn total_objective(plans: &[(f64, u32)], cycle_sec: f64) -> f64 {
    let mut total_wait = 0.0;
    let mut total_buses = 0u32;
    for &(people, buses) in plans {
        if people <= 0.0 {
            continue;
        }
        total_wait += people * avg_wait_for_route(cycle_sec, buses);
        total_buses += buses;
    }
    total_wait + PENALTY_PER_BUS * total_buses as f64
}

/// Sum a route's crowd over its stops, dividing a branching stop's count by
/// the number of branches leaving it.
fn route_people(network: &Network, stop_ids: &[StopId], counts: &HashMap<StopId, u32>) -> f64 {
    stop_ids
        .iter()
        .map(|&stop| {
            let people = counts.get(&stop).copied().unwrap_or(0) as f64;
            match network.branch_split(stop) {
                Some(split) => people / split as f64,
                None => people,
            }
        })
        .sum()
}

/// Allocate `total_buses` across the network's routes for a run of
/// `total_cycles` seconds, given per-stop people counts.
pub fn allocate_fleet(
    network: &Network,
    people_per_stop: &HashMap<StopId, u32>,
    total_buses: u32,
    total_cycles: u32,
) -> Result<FleetPlan, AllocationError> {
    let num_routes = network.routes.len() as u32;
    if total_buses < num_routes {
        return Err(AllocationError::FleetTooSmall {
            required: num_routes,
            provided: total_buses,
        });
    }

    let people: Vec<f64> = network
        .routes
        .iter()
        .map(|r| route_people(network, &r.stop_ids, people_per_stop))
        .collect();
    let people_total: f64 = people.iter().sum();

    // Minimum per route: at least one bus, and enough for the counted crowd.
    // Maximum useful per route: beyond floor(cycle / MIN_FREQUENCY_SEC) the
    // dispatch interval cannot shrink any further.
    let min_required: Vec<u32> = people
        .iter()
        .map(|&p| {
            let need = if p <= 0.0 {
                1
            } else {
                ((p / BUS_CAPACITY).ceil() as u32).max(1)
            };
            need.min(MAX_BUSES_PER_ROUTE)
        })
        .collect();
    let max_useful = if total_cycles > 0 {
        (((total_cycles as f64 / MIN_FREQUENCY_SEC).floor() as u32).max(1)).min(MAX_BUSES_PER_ROUTE)
    } else {
        MAX_BUSES_PER_ROUTE
    };

    let mut alloc = min_required.clone();

    // Capacity minimums can exceed the fleet; shed from the quietest routes
    // first, never below one bus.
    let mut used: u32 = alloc.iter().sum();
    if used > total_buses {
        let mut order: Vec<usize> = (0..alloc.len()).collect();
        order.sort_by(|&a, &b| people[a].total_cmp(&people[b]));
        let mut excess = used - total_buses;
        let mut i = 0;
        while excess > 0 && i < order.len() {
            let idx = order[i];
            if alloc[idx] > 1 {
                alloc[idx] -= 1;
                excess -= 1;
            } else {
                i += 1;
            }
        }
        used = alloc.iter().sum();
    }

    // Greedy top-up: one bus at a time to the route with the best marginal
    // gain, stopping when no addition still pays for its penalty.
    let cycle = if total_cycles > 0 {
        total_cycles as f64
    } else {
        1.0
    };
    let extra_slots: u32 = alloc.iter().map(|&a| max_useful.saturating_sub(a)).sum();
    let additions_allowed = (total_buses - used).min(extra_slots);

    for _ in 0..additions_allowed {
        let mut best_gain = 0.0;
        let mut best_idx = None;
        let current: Vec<(f64, u32)> = people.iter().copied().zip(alloc.iter().copied()).collect();
        let before = total_objective(&current, cycle);
        for idx in 0..alloc.len() {
            if alloc[idx] >= max_useful || alloc[idx] >= MAX_BUSES_PER_ROUTE {
                continue;
            }
            let mut candidate = current.clone();
            candidate[idx].1 += 1;
            let gain = before - total_objective(&candidate, cycle);
            if gain > best_gain {
                best_gain = gain;
                best_idx = Some(idx);
            }
        }
        match best_idx {
            Some(idx) if best_gain > 1e-6 => alloc[idx] += 1,
            _ => break,
        }
    }

    let final_used: u32 = alloc.iter().sum();
    let routes = network
        .routes
        .iter()
        .enumerate()
        .map(|(idx, route)| {
            let buses = alloc[idx];
            let raw_freq = if total_cycles > 0 {
                total_cycles as f64 / buses as f64
            } else {
                f64::INFINITY
            };
            RoutePlan {
                route_id: route.id,
                route_name: route.name.clone(),
                total_people: (people[idx] * 100.0).round() / 100.0,
                probability: if people_total > 0.0 {
                    (people[idx] / people_total * 10_000.0).round() / 100.0
                } else {
                    0.0
                },
                buses_allocated: buses,
                frequency_seconds: raw_freq.max(MIN_FREQUENCY_SEC),
            }
        })
        .collect();

    Ok(FleetPlan {
        routes,
        saved_buses: total_buses.saturating_sub(final_used),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(StopId, u32)]) -> HashMap<StopId, u32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn wait_halves_the_interval_and_floors_it() {
        assert_eq!(avg_wait_for_route(100.0, 2), 25.0);
        // 100 / 20 = 5s interval, floored to MIN_FREQUENCY_SEC.
        assert_eq!(avg_wait_for_route(100.0, 20), MIN_FREQUENCY_SEC / 2.0);
        assert!(avg_wait_for_route(100.0, 0).is_infinite());
    }

    #[test]
    fn branch_splits_divide_shared_crowds() {
        let network = Network::default();
        // 60 people at B3 (2 branches), 90 at B6 (3 branches).
        let people = counts(&[(3, 60), (6, 90)]);
        let plan = allocate_fleet(&network, &people, 8, 120).unwrap();
        // Route 1 passes B3 only: 60/2 = 30. Route 2 passes both: 30 + 30.
        assert_eq!(plan.routes[0].total_people, 30.0);
        assert_eq!(plan.routes[1].total_people, 60.0);
    }

    #[test]
    fn probabilities_sum_to_one_hundred() {
        let network = Network::default();
        let people = counts(&[(1, 40), (6, 90), (9, 10)]);
        let plan = allocate_fleet(&network, &people, 10, 300).unwrap();
        let sum: f64 = plan.routes.iter().map(|r| r.probability).sum();
        assert!((sum - 100.0).abs() < 0.1, "probabilities sum to {sum}");
    }

    #[test]
    fn fleet_smaller_than_route_count_is_rejected() {
        let network = Network::default();
        let err = allocate_fleet(&network, &HashMap::new(), 3, 120).unwrap_err();
        assert_eq!(
            err,
            AllocationError::FleetTooSmall {
                required: 4,
                provided: 3
            }
        );
    }

    #[test]
    fn every_route_gets_at_least_one_bus() {
        let network = Network::default();
        let plan = allocate_fleet(&network, &HashMap::new(), 4, 120).unwrap();
        for route in &plan.routes {
            assert_eq!(route.buses_allocated, 1);
        }
        assert_eq!(plan.saved_buses, 0);
    }

    #[test]
    fn idle_fleet_is_saved_not_forced_out() {
        let network = Network::default();
        // No crowd anywhere: extra buses have no positive marginal gain.
        let plan = allocate_fleet(&network, &HashMap::new(), 20, 120).unwrap();
        let used: u32 = plan.routes.iter().map(|r| r.buses_allocated).sum();
        assert_eq!(used, 4);
        assert_eq!(plan.saved_buses, 16);
    }

    #[test]
    fn busy_route_attracts_the_extra_buses() {
        let network = Network::default();
        // Crowd only at B9, which only Route 3 serves.
        let people = counts(&[(9, 200)]);
        let plan = allocate_fleet(&network, &people, 16, 300).unwrap();
        let route3 = plan.routes.iter().find(|r| r.route_id == 3).unwrap();
        for route in &plan.routes {
            assert!(route.buses_allocated <= route3.buses_allocated);
        }
        assert!(route3.buses_allocated > 1);
    }

    #[test]
    fn greedy_topups_stop_at_max_useful() {
        let network = Network::default();
        let people = counts(&[(9, 30)]);
        // cycle 30s, min frequency 10s: beyond 3 buses the interval cannot
        // shrink, so the plentiful fleet must not pile onto route 3.
        let plan = allocate_fleet(&network, &people, 40, 30).unwrap();
        for route in &plan.routes {
            assert!(route.buses_allocated <= 3);
        }
        let route3 = plan.routes.iter().find(|r| r.route_id == 3).unwrap();
        assert_eq!(route3.buses_allocated, 3);
        assert_eq!(plan.saved_buses, 34);
    }

    #[test]
    fn frequency_never_drops_below_minimum() {
        let network = Network::default();
        let people = counts(&[(1, 500), (3, 500), (6, 500)]);
        let plan = allocate_fleet(&network, &people, 120, 200).unwrap();
        for route in &plan.routes {
            assert!(route.frequency_seconds >= MIN_FREQUENCY_SEC);
        }
    }

    #[test]
    fn legacy_frequency_field_name_is_accepted() {
        let json = r#"{
            "route_id": 1,
            "route_name": "Route 1: Northern Express",
            "total_people": 12.5,
            "probability": 25.0,
            "buses_allocated": 2,
            "frequency_minutes": 60.0
        }"#;
        let plan: RoutePlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.frequency_seconds, 60.0);
    }
}
