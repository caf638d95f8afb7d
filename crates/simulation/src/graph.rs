//! Shortest-path search over the directed stop graph.

use pathfinding::prelude::bfs;

use crate::network::{Network, StopId};

/// Shortest unweighted path from `start` to `end`, or `None` if no directed
/// path exists.
///
/// `start == end` is trivially reachable and returns the single-element
/// path, matching how manual trips treat a self-route. Otherwise a
/// breadth-first search visits each stop at most once, so the first path to
/// reach `end` has the minimum edge count; ties resolve by edge-insertion
/// order. Pure and safe to call from anywhere, including tests, without
/// coordination.
pub fn shortest_path(start: StopId, end: StopId, network: &Network) -> Option<Vec<StopId>> {
    if start == end {
        return Some(vec![start]);
    }
    bfs(
        &start,
        |&stop| network.directed_successors(stop),
        |&stop| stop == end,
    )
}
