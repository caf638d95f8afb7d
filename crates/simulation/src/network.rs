//! Static transit network: stops, directed curved edges and route templates.
//!
//! Loaded once at startup (either the built-in default map or JSON) and never
//! mutated afterwards; every other module reads it through `Res<Network>`.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique identifier for a stop.
pub type StopId = u32;

/// Unique identifier for a route.
pub type RouteId = u32;

/// Category of a stop on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    /// End of the line; vehicles terminate here.
    Terminal,
    /// Regular intermediate stop.
    Stop,
    /// Branching point where routes diverge.
    Hub,
}

/// A stop in the transit network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    /// Short code shown on the map ("B1").
    pub code: String,
    /// Full display name.
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub kind: StopKind,
}

impl Stop {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A directed edge between two stops.
///
/// The curvature offset bows the segment at its midpoint; see
/// [`crate::geometry::control_point`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDef {
    pub from: StopId,
    pub to: StopId,
    pub curve_x: f32,
    pub curve_y: f32,
}

impl EdgeDef {
    pub fn curve_offset(&self) -> Vec2 {
        Vec2::new(self.curve_x, self.curve_y)
    }
}

/// A named route: an ordered, non-empty sequence of stop ids plus a display
/// color. Routes are templates; vehicles copy the stop sequence at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub id: RouteId,
    pub name: String,
    pub stop_ids: Vec<StopId>,
    /// Display color as RGB.
    pub color: [u8; 3],
}

/// The whole network. Immutable after load.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub stops: Vec<Stop>,
    pub edges: Vec<EdgeDef>,
    pub routes: Vec<RouteDefinition>,
    /// Precomputed (from, to) -> edge index so segment lookup during the
    /// render tick is O(1) instead of a scan over the edge list.
    #[serde(skip)]
    edge_index: HashMap<(StopId, StopId), usize>,
}

impl Default for Network {
    fn default() -> Self {
        default_network()
    }
}

impl Network {
    /// Build a network from parts, enforcing the single-edge-per-ordered-pair
    /// invariant: a duplicate (from, to) pair keeps the first edge and logs
    /// a warning.
    pub fn from_parts(stops: Vec<Stop>, edges: Vec<EdgeDef>, routes: Vec<RouteDefinition>) -> Self {
        let mut network = Self {
            stops,
            edges,
            routes,
            edge_index: HashMap::new(),
        };
        network.rebuild_edge_index();
        network
    }

    /// Parse a network from JSON and rebuild the edge index.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut network: Network = serde_json::from_str(json)?;
        network.rebuild_edge_index();
        Ok(network)
    }

    fn rebuild_edge_index(&mut self) {
        self.edge_index.clear();
        for (idx, edge) in self.edges.iter().enumerate() {
            let key = (edge.from, edge.to);
            if self.edge_index.contains_key(&key) {
                warn!(
                    "duplicate edge {} -> {}: keeping the first definition",
                    edge.from, edge.to
                );
                continue;
            }
            self.edge_index.insert(key, idx);
        }
    }

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    pub fn stop_by_code(&self, code: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.code == code)
    }

    pub fn route(&self, id: RouteId) -> Option<&RouteDefinition> {
        self.routes.iter().find(|r| r.id == id)
    }

    /// The directed edge from `from` to `to`, if one exists.
    pub fn edge_between(&self, from: StopId, to: StopId) -> Option<&EdgeDef> {
        self.edge_index.get(&(from, to)).map(|&i| &self.edges[i])
    }

    /// Destinations reachable in one hop from `stop`, in edge-insertion
    /// order. Feeds the BFS, so this order is also its tie-break order.
    pub fn directed_successors(&self, stop: StopId) -> Vec<StopId> {
        self.edges
            .iter()
            .filter(|e| e.from == stop)
            .map(|e| e.to)
            .collect()
    }

    /// How many branches leave this stop, when it is a branching point.
    ///
    /// Returns `Some(out_degree)` only for out-degree > 1. Used by fleet
    /// allocation to split a shared stop's crowd across the routes that
    /// serve its branches.
    pub fn branch_split(&self, stop: StopId) -> Option<u32> {
        let degree = self.edges.iter().filter(|e| e.from == stop).count() as u32;
        (degree > 1).then_some(degree)
    }

    /// Axis-aligned bounding box of all stop positions.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for stop in &self.stops {
            min = min.min(stop.position());
            max = max.max(stop.position());
        }
        if self.stops.is_empty() {
            (Vec2::ZERO, Vec2::ZERO)
        } else {
            (min, max)
        }
    }
}

/// The built-in ten-stop map with its four published routes.
pub fn default_network() -> Network {
    let stop = |id, code: &str, name: &str, x, y, kind| Stop {
        id,
        code: code.to_string(),
        name: name.to_string(),
        x,
        y,
        kind,
    };
    let stops = vec![
        stop(1, "B1", "Central Depot", -520.0, 0.0, StopKind::Terminal),
        stop(2, "B2", "Riverside", -360.0, 70.0, StopKind::Stop),
        stop(3, "B3", "North Junction", -200.0, 0.0, StopKind::Hub),
        stop(4, "B4", "Hillcrest", -60.0, 120.0, StopKind::Stop),
        stop(5, "B5", "Northgate", 100.0, 180.0, StopKind::Terminal),
        stop(6, "B6", "South Junction", -60.0, -120.0, StopKind::Hub),
        stop(7, "B7", "Market Square", 100.0, -40.0, StopKind::Terminal),
        stop(8, "B8", "Lakeview", 60.0, -220.0, StopKind::Stop),
        stop(9, "B9", "Harbour End", 220.0, -280.0, StopKind::Terminal),
        stop(10, "B10", "Southgate", 120.0, -140.0, StopKind::Terminal),
    ];
    let edge = |from, to, curve_x, curve_y| EdgeDef {
        from,
        to,
        curve_x,
        curve_y,
    };
    let edges = vec![
        edge(1, 2, 0.0, 40.0),
        edge(2, 3, 0.0, -40.0),
        edge(3, 4, -20.0, 30.0),
        edge(4, 5, 0.0, 30.0),
        edge(3, 6, 30.0, 0.0),
        edge(6, 7, 0.0, 40.0),
        edge(6, 8, -30.0, -20.0),
        edge(8, 9, 0.0, -40.0),
        edge(6, 10, 40.0, -10.0),
    ];
    let route = |id, name: &str, stop_ids: Vec<StopId>, color| RouteDefinition {
        id,
        name: name.to_string(),
        stop_ids,
        color,
    };
    let routes = vec![
        route(
            1,
            "Route 1: Northern Express",
            vec![1, 2, 3, 4, 5],
            [66, 133, 244],
        ),
        route(
            2,
            "Route 2: Central Link",
            vec![1, 2, 3, 6, 7],
            [52, 168, 83],
        ),
        route(
            3,
            "Route 3: Long Haul South",
            vec![1, 2, 3, 6, 8, 9],
            [234, 67, 53],
        ),
        route(
            4,
            "Route 4: Southern Edge",
            vec![1, 2, 3, 6, 10],
            [251, 188, 4],
        ),
    ];
    Network::from_parts(stops, edges, routes)
}
