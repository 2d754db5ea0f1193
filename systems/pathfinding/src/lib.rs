#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Jump-aware A* search over the tile map.
//!
//! The search expands grid cells with three move primitives: walking one
//! column sideways onto supported ground, jumping straight up from supported
//! ground, and falling (straight down or off a ledge) to the first cell that
//! offers a landing. A fall off a ledge passes through the column beside the
//! ledge, and that cell is kept in the route so every segment is either
//! horizontal or vertical. Edge validity depends on the agent's footprint and its
//! maximum jump height; jump edges are priced with the jump frame table so
//! tall jumps are only taken when nothing gentler reaches the goal.

use std::{cmp::Reverse, collections::BinaryHeap};

use platform_nav_core::{jump_frames, AgentConfig, Footprint, Path, TileCoord, TileType};
use platform_nav_world::GridMap;

/// Parameters of a single route search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathRequest {
    /// Anchor tile the agent starts from.
    pub start: TileCoord,
    /// Anchor tile the agent must reach.
    pub goal: TileCoord,
    /// Tiles occupied by the agent's body.
    pub footprint: Footprint,
    /// Tallest rise, in tiles, a single jump edge may climb.
    pub max_jump_height: u32,
    /// Whether one-way platforms fail to stop a fall.
    pub ignores_one_way: bool,
}

impl PathRequest {
    /// Creates a request using the footprint and movement limits of `config`.
    #[must_use]
    pub fn for_agent(start: TileCoord, goal: TileCoord, config: &AgentConfig) -> Self {
        Self {
            start,
            goal,
            footprint: config.footprint,
            max_jump_height: config.max_jump_height,
            ignores_one_way: config.ignores_one_way,
        }
    }
}

/// Reusable route planner with a bounded node-expansion budget.
#[derive(Debug)]
pub struct PathFinder {
    search_limit: usize,
    workspace: SearchWorkspace,
}

impl PathFinder {
    /// Expansion budget used by [`PathFinder::new`].
    pub const DEFAULT_SEARCH_LIMIT: usize = 1_000_000;

    /// Creates a planner with the default expansion budget.
    #[must_use]
    pub fn new() -> Self {
        Self::with_search_limit(Self::DEFAULT_SEARCH_LIMIT)
    }

    /// Creates a planner that gives up after expanding `search_limit` cells.
    #[must_use]
    pub fn with_search_limit(search_limit: usize) -> Self {
        Self {
            search_limit,
            workspace: SearchWorkspace::default(),
        }
    }

    /// Plans a route for the request, returning waypoints from the start to
    /// the goal inclusive.
    ///
    /// `None` is an ordinary outcome: the goal may be unreachable under the
    /// move primitives, the start or goal footprint may overlap a block, or the
    /// expansion budget may run out. Identical inputs always produce identical
    /// routes because equally promising cells are expanded in discovery order.
    pub fn find_path(&mut self, map: &GridMap, request: &PathRequest) -> Option<Path> {
        let footprint = request.footprint;
        if !map.fits(request.start, footprint) || !map.fits(request.goal, footprint) {
            tracing::debug!(
                start = ?request.start,
                goal = ?request.goal,
                "path search rejected: footprint does not fit at an endpoint"
            );
            return None;
        }

        if request.start == request.goal {
            return Some(vec![request.start]);
        }

        let side = usize::try_from(map.size()).ok()?;
        let start_index = index(side, request.start)?;
        let goal_index = index(side, request.goal)?;
        self.workspace.prepare(side);

        let workspace = &mut self.workspace;
        let mut frontier = BinaryHeap::new();
        let mut sequence: u64 = 0;
        workspace.costs[start_index] = 0;
        frontier.push(Reverse(FrontierEntry {
            estimate: request.start.manhattan_distance(request.goal),
            sequence,
            index: start_index,
        }));

        let mut expanded = 0usize;
        while let Some(Reverse(entry)) = frontier.pop() {
            if workspace.closed[entry.index] {
                continue;
            }
            workspace.closed[entry.index] = true;

            expanded += 1;
            if expanded > self.search_limit {
                tracing::debug!(
                    limit = self.search_limit,
                    start = ?request.start,
                    goal = ?request.goal,
                    "path search exhausted its expansion budget"
                );
                return None;
            }

            if entry.index == goal_index {
                let path = workspace.reconstruct(side, goal_index);
                tracing::trace!(waypoints = path.len(), expanded, "path search succeeded");
                return Some(path);
            }

            let tile = coord(side, entry.index);
            let cost = workspace.costs[entry.index];
            collect_edges(map, request, tile, &mut workspace.edges);

            for edge in workspace.edges.drain(..) {
                let Some(next_index) = index(side, edge.to) else {
                    continue;
                };
                if workspace.closed[next_index] {
                    continue;
                }

                let tentative = cost.saturating_add(edge.cost);
                if tentative >= workspace.costs[next_index] {
                    continue;
                }

                workspace.costs[next_index] = tentative;
                workspace.parents[next_index] = Some(entry.index);
                workspace.vias[next_index] = edge.via;
                sequence += 1;
                frontier.push(Reverse(FrontierEntry {
                    estimate: tentative.saturating_add(edge.to.manhattan_distance(request.goal)),
                    sequence,
                    index: next_index,
                }));
            }
        }

        tracing::debug!(
            start = ?request.start,
            goal = ?request.goal,
            expanded,
            "path search found no route"
        );
        None
    }
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    estimate: u32,
    sequence: u64,
    index: usize,
}

#[derive(Clone, Copy, Debug)]
struct Edge {
    to: TileCoord,
    cost: u32,
    /// Waypoint between the parent and `to` for edges that turn a corner.
    via: Option<TileCoord>,
}

impl Edge {
    const fn direct(to: TileCoord, cost: u32) -> Self {
        Self {
            to,
            cost,
            via: None,
        }
    }
}

#[derive(Debug, Default)]
struct SearchWorkspace {
    costs: Vec<u32>,
    parents: Vec<Option<usize>>,
    vias: Vec<Option<TileCoord>>,
    closed: Vec<bool>,
    edges: Vec<Edge>,
}

impl SearchWorkspace {
    fn prepare(&mut self, side: usize) {
        let cell_count = side.saturating_mul(side);
        if self.costs.len() != cell_count {
            self.costs = vec![u32::MAX; cell_count];
            self.parents = vec![None; cell_count];
            self.vias = vec![None; cell_count];
            self.closed = vec![false; cell_count];
        } else {
            self.costs.fill(u32::MAX);
            self.parents.fill(None);
            self.vias.fill(None);
            self.closed.fill(false);
        }
        self.edges.clear();
    }

    fn reconstruct(&self, side: usize, goal_index: usize) -> Path {
        let mut path = vec![coord(side, goal_index)];
        let mut current = goal_index;
        while let Some(parent) = self.parents[current] {
            if let Some(via) = self.vias[current] {
                path.push(via);
            }
            path.push(coord(side, parent));
            current = parent;
        }
        path.reverse();
        path
    }
}

fn collect_edges(map: &GridMap, request: &PathRequest, tile: TileCoord, out: &mut Vec<Edge>) {
    let footprint = request.footprint;
    let standing = map.is_supported(tile, footprint);

    for dx in [-1, 1] {
        let side = tile.offset(dx, 0);
        if !map.fits(side, footprint) {
            continue;
        }

        if map.is_supported(side, footprint) {
            out.push(Edge::direct(side, 1));
        } else if let Some((landing, drop)) = fall_from(map, request, side) {
            out.push(Edge {
                to: landing,
                cost: drop + 1,
                via: Some(side),
            });
        }
    }

    if standing {
        for rise in 1..=request.max_jump_height {
            let apex = tile.offset(0, rise as i32);
            if !map.fits(apex, footprint) {
                break;
            }
            out.push(Edge::direct(apex, rise + jump_frames(rise as i32)));
        }
    }

    if !has_landing(map, request, tile) {
        if let Some((landing, drop)) = fall_from(map, request, tile) {
            out.push(Edge::direct(landing, drop));
        }
    }
}

/// Descends from `from` to the first cell that offers a landing, returning the
/// landing cell and the number of rows dropped.
fn fall_from(map: &GridMap, request: &PathRequest, from: TileCoord) -> Option<(TileCoord, u32)> {
    let mut current = from;
    let mut drop = 0u32;
    loop {
        let next = current.below();
        if !map.fits(next, request.footprint) {
            return None;
        }
        drop += 1;
        if has_landing(map, request, next) {
            return Some((next, drop));
        }
        current = next;
    }
}

/// Reports whether a falling footprint anchored at `tile` would come to rest.
fn has_landing(map: &GridMap, request: &PathRequest, tile: TileCoord) -> bool {
    request
        .footprint
        .tiles_below(tile)
        .any(|below| match map.classify(below) {
            TileType::Block => true,
            TileType::OneWay => !request.ignores_one_way,
            TileType::Empty => false,
        })
}

fn index(side: usize, tile: TileCoord) -> Option<usize> {
    let column = usize::try_from(tile.x()).ok()?;
    let row = usize::try_from(tile.y()).ok()?;
    if column >= side || row >= side {
        return None;
    }
    row.checked_mul(side)?.checked_add(column)
}

fn coord(side: usize, index: usize) -> TileCoord {
    TileCoord::new((index % side) as i32, (index / side) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn request(start: TileCoord, goal: TileCoord) -> PathRequest {
        PathRequest::for_agent(start, goal, &AgentConfig::default())
    }

    #[test]
    fn walking_is_cheapest_on_open_floor() {
        let map = GridMap::new(20, Vec2::ZERO);
        let mut edges = Vec::new();
        collect_edges(
            &map,
            &request(TileCoord::new(5, 2), TileCoord::new(9, 2)),
            TileCoord::new(5, 2),
            &mut edges,
        );

        let walks: Vec<_> = edges.iter().filter(|edge| edge.cost == 1).collect();
        assert_eq!(walks.len(), 2);
        assert!(edges
            .iter()
            .any(|edge| edge.to == TileCoord::new(5, 7) && edge.cost == 5 + jump_frames(5)));
        assert!(edges.iter().all(|edge| edge.to.y() <= 7));
    }

    #[test]
    fn unsupported_cells_fall_to_the_floor() {
        let map = GridMap::new(20, Vec2::ZERO);
        let mut edges = Vec::new();
        collect_edges(
            &map,
            &request(TileCoord::new(5, 9), TileCoord::new(9, 2)),
            TileCoord::new(5, 9),
            &mut edges,
        );

        assert!(edges
            .iter()
            .any(|edge| edge.to == TileCoord::new(5, 2) && edge.cost == 7 && edge.via.is_none()));
        assert!(edges.iter().any(|edge| edge.to == TileCoord::new(6, 2)
            && edge.cost == 8
            && edge.via == Some(TileCoord::new(6, 9))));
        assert!(edges.iter().all(|edge| edge.to.y() < 9));
    }

    #[test]
    fn ledge_falls_keep_the_side_column_as_a_waypoint() {
        let mut workspace = SearchWorkspace::default();
        workspace.prepare(20);
        let side = 20;
        let ledge = index(side, TileCoord::new(10, 5)).expect("in bounds");
        let landing = index(side, TileCoord::new(11, 2)).expect("in bounds");
        workspace.parents[landing] = Some(ledge);
        workspace.vias[landing] = Some(TileCoord::new(11, 5));

        assert_eq!(
            workspace.reconstruct(side, landing),
            vec![
                TileCoord::new(10, 5),
                TileCoord::new(11, 5),
                TileCoord::new(11, 2)
            ]
        );
    }

    #[test]
    fn one_way_platforms_stop_falls_unless_ignored() {
        let mut map = GridMap::new(20, Vec2::ZERO);
        map.set_tile(TileCoord::new(5, 5), TileType::OneWay);
        let mut request = request(TileCoord::new(5, 9), TileCoord::new(5, 2));

        assert_eq!(
            fall_from(&map, &request, TileCoord::new(5, 9)),
            Some((TileCoord::new(5, 6), 3))
        );

        request.ignores_one_way = true;
        assert_eq!(
            fall_from(&map, &request, TileCoord::new(5, 9)),
            Some((TileCoord::new(5, 2), 7))
        );
    }

    #[test]
    fn frontier_prefers_lower_estimate_then_discovery_order() {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(FrontierEntry {
            estimate: 4,
            sequence: 2,
            index: 9,
        }));
        heap.push(Reverse(FrontierEntry {
            estimate: 4,
            sequence: 1,
            index: 12,
        }));
        heap.push(Reverse(FrontierEntry {
            estimate: 6,
            sequence: 0,
            index: 3,
        }));

        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|Reverse(entry)| entry.index))
            .collect();
        assert_eq!(order, vec![12, 9, 3]);
    }
}
