#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Route-following executor that steers a single agent along planned waypoints.
//!
//! A [`Bot`] owns its route and its path planner but never the map: every call
//! that needs terrain borrows a [`GridMap`]. Work happens in update cycles.
//! [`Bot::schedule_update`] opens a cycle, [`Bot::tick`] advances it by one
//! frame, and the cycle closes once the route completes (or, when idle, once a
//! one-unit fall settles). Opening a cycle while one is running is a no-op.

use std::time::Duration;

use glam::Vec2;
use platform_nav_core::{jump_frames, AgentConfig, MotionPhase, Path, TileCoord};
use platform_nav_system_pathfinding::{PathFinder, PathRequest};
use platform_nav_world::{query, GridMap};

/// Multiple of the arrival tolerance below which an overshooting axis is snapped.
pub const SNAP_FACTOR: f32 = 3.0;

/// Axis-aligned box covering an agent's body in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    center: Vec2,
    half_size: Vec2,
}

impl Aabb {
    /// Creates a box from its center and half extents.
    #[must_use]
    pub const fn new(center: Vec2, half_size: Vec2) -> Self {
        Self { center, half_size }
    }

    /// Center of the box.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Half extents of the box.
    #[must_use]
    pub const fn half_size(&self) -> Vec2 {
        self.half_size
    }

    /// Bottom-left corner.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_size
    }

    /// Top-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_size
    }

    /// Box covering a single map tile.
    #[must_use]
    pub fn tile(map: &GridMap, tile: TileCoord) -> Self {
        Self::new(map.tile_to_world(tile), Vec2::splat(0.5))
    }

    /// Reports whether the boxes share interior area; touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (min, max) = (self.min(), self.max());
        let (other_min, other_max) = (other.min(), other.max());
        min.x < other_max.x && max.x > other_min.x && min.y < other_max.y && max.y > other_min.y
    }

    /// Center of the bottom-left tile covered by the box, the point compared
    /// against waypoints.
    #[must_use]
    pub fn path_anchor(&self) -> Vec2 {
        self.min() + Vec2::splat(0.5)
    }
}

/// Reports whether a moving coordinate has reached `target` on one axis.
///
/// The axis counts as reached once the coordinate sits at or beyond `target`
/// when travelling from `previous`, or when it lies within `tolerance` of it.
/// A segment with no extent along the axis is always reached.
#[must_use]
pub fn reached_axis(position: f32, previous: f32, target: f32, tolerance: f32) -> bool {
    (previous <= target && position >= target)
        || (previous >= target && position <= target)
        || (position - target).abs() <= tolerance
}

/// Reports whether a reached axis overshot far enough to need snapping back.
#[must_use]
pub fn needs_snap(position: f32, target: f32, tolerance: f32) -> bool {
    let residual = (position - target).abs();
    residual > tolerance && residual < tolerance * SNAP_FACTOR
}

/// Agent that plans routes on demand and follows them frame by frame.
#[derive(Debug)]
pub struct Bot {
    config: AgentConfig,
    position: Vec2,
    phase: MotionPhase,
    path: Path,
    jump_frames: u32,
    on_ground: bool,
    updating: bool,
    fall_target: Option<Vec2>,
    finder: PathFinder,
}

impl Bot {
    /// Creates an idle agent at the provided world position.
    #[must_use]
    pub fn new(config: AgentConfig, position: Vec2) -> Self {
        Self::with_path_finder(config, position, PathFinder::new())
    }

    /// Creates an idle agent that plans with the supplied path finder.
    #[must_use]
    pub fn with_path_finder(config: AgentConfig, position: Vec2, finder: PathFinder) -> Self {
        Self {
            config,
            position,
            phase: MotionPhase::Idle,
            path: Path::new(),
            jump_frames: 0,
            on_ground: false,
            updating: false,
            fall_target: None,
            finder,
        }
    }

    /// Settings the agent was created with.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current route-following state.
    #[must_use]
    pub const fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// World-space position of the agent's anchor tile center.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the agent instantly, abandoning any pending idle fall.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.fall_target = None;
    }

    /// Waypoints of the active route; empty while idle.
    #[must_use]
    pub fn path(&self) -> &[TileCoord] {
        &self.path
    }

    /// Index of the waypoint being approached, if a route is active.
    #[must_use]
    pub const fn current_node(&self) -> Option<usize> {
        match self.phase {
            MotionPhase::Idle => None,
            MotionPhase::Following { node } => Some(node),
        }
    }

    /// Waypoints bounding the segment being travelled, if a route is active.
    #[must_use]
    pub fn current_segment(&self) -> Option<(TileCoord, TileCoord)> {
        let node = self.current_node()?;
        let from = *self.path.get(node.checked_sub(1)?)?;
        let to = *self.path.get(node)?;
        Some((from, to))
    }

    /// Remaining frames of the jump currently being executed.
    #[must_use]
    pub const fn jump_frames(&self) -> u32 {
        self.jump_frames
    }

    /// Result of the latest ground probe.
    #[must_use]
    pub const fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Reports whether an update cycle is in progress.
    #[must_use]
    pub const fn is_updating(&self) -> bool {
        self.updating
    }

    /// World-space box covered by the agent's footprint.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        let footprint = self.config.footprint;
        let half_size = Vec2::new(footprint.width() as f32, footprint.height() as f32) * 0.5;
        Aabb::new(self.position - Vec2::splat(0.5) + half_size, half_size)
    }

    /// Reports whether the agent's body overlaps any block tile.
    #[must_use]
    pub fn collides_with_map(&self, map: &GridMap) -> bool {
        let body = self.aabb();
        let low = map.world_to_tile(body.min());
        let high = map.world_to_tile(body.max());
        (low.y()..=high.y()).any(|y| {
            (low.x()..=high.x()).any(|x| {
                let tile = TileCoord::new(x, y);
                map.is_obstacle(tile) && body.overlaps(&Aabb::tile(map, tile))
            })
        })
    }

    /// Plans a route from the agent's current tile to `destination`.
    ///
    /// Returns `true` when a route with at least one step was assigned. When no
    /// route exists, or the agent already stands on `destination`, the agent
    /// goes idle without moving. Any segment or fall in progress is abandoned.
    pub fn request_move(&mut self, map: &GridMap, destination: TileCoord) -> bool {
        self.on_ground = self.probe_ground(map);
        self.fall_target = None;

        let footprint = self.config.footprint;
        let mut start = map.world_to_tile(self.position);
        if self.on_ground && !map.can_stand(start, footprint) {
            let right = start.offset(1, 0);
            start = if map.can_stand(right, footprint) {
                right
            } else {
                start.offset(-1, 0)
            };
        }

        let request = PathRequest::for_agent(start, destination, &self.config);
        match self.finder.find_path(map, &request) {
            Some(path) if path.len() > 1 => {
                tracing::debug!(
                    ?start,
                    ?destination,
                    waypoints = path.len(),
                    "route assigned"
                );
                self.path = path;
                self.phase = MotionPhase::Following { node: 1 };
                self.jump_frames = self.jump_frames_for_node(map, 0);
                true
            }
            _ => {
                tracing::debug!(?start, ?destination, "no route, agent idles");
                self.path.clear();
                self.phase = MotionPhase::Idle;
                self.jump_frames = 0;
                false
            }
        }
    }

    /// Plans a route to the tile containing the world-space `point`.
    pub fn request_move_to_point(&mut self, map: &GridMap, point: Vec2) -> bool {
        self.request_move(map, map.world_to_tile(point))
    }

    /// Requests a move to the first standing spot at or below `tile`.
    pub fn tap_tile(&mut self, map: &GridMap, tile: TileCoord) -> bool {
        self.request_move(map, query::landing_tile_on(map, tile))
    }

    /// Opens an update cycle; returns `false` if one is already running.
    pub fn schedule_update(&mut self) -> bool {
        if self.updating {
            return false;
        }
        self.updating = true;
        true
    }

    /// Advances the running update cycle by one frame of length `dt`.
    ///
    /// Returns whether the cycle is still in progress. Without a running cycle
    /// the call does nothing.
    pub fn tick(&mut self, map: &GridMap, dt: Duration) -> bool {
        if !self.updating {
            return false;
        }

        self.jump_frames = self.jump_frames.saturating_sub(1);
        self.on_ground = self.probe_ground(map);

        let running = match self.phase {
            MotionPhase::Idle => self.idle_step(map, dt),
            MotionPhase::Following { node } => self.follow_step(map, node, dt),
        };
        if !running {
            self.updating = false;
        }
        running
    }

    /// Opens a cycle if none is running and advances it by one frame.
    pub fn update(&mut self, map: &GridMap, dt: Duration) -> bool {
        let _ = self.schedule_update();
        self.tick(map, dt)
    }

    fn follow_step(&mut self, map: &GridMap, node: usize, dt: Duration) -> bool {
        let Some((previous_tile, current_tile)) = self.current_segment() else {
            self.finish_route();
            return false;
        };
        let previous = map.tile_to_world(previous_tile);
        let current = map.tile_to_world(current_tile);
        let tolerance = self.config.position_error;

        // Snapping corrects overshoots left by a replan or a nudged start.
        if reached_axis(self.position.x, previous.x, current.x, tolerance)
            && needs_snap(self.position.x, current.x, tolerance)
        {
            self.position.x = current.x;
        }
        if reached_axis(self.position.y, previous.y, current.y, tolerance)
            && needs_snap(self.position.y, current.y, tolerance)
        {
            self.position.y = current.y;
        }

        self.step_toward(current, dt);
        if self.position != current {
            return true;
        }

        // Landing waypoints are only reached once the agent touches down.
        self.on_ground = self.probe_ground(map);
        if map.is_supported(current_tile, self.config.footprint) && !self.on_ground {
            return true;
        }

        let next = node + 1;
        if next >= self.path.len() {
            self.finish_route();
            return false;
        }

        self.phase = MotionPhase::Following { node: next };
        if self.on_ground {
            self.jump_frames = self.jump_frames_for_node(map, node);
        }
        tracing::trace!(node = next, waypoint = ?self.path[next], "waypoint reached");
        true
    }

    fn idle_step(&mut self, map: &GridMap, dt: Duration) -> bool {
        let target = match self.fall_target {
            Some(target) => target,
            None if self.on_ground => return false,
            None => {
                let landing =
                    map.tile_to_world(query::landing_tile_on(map, map.world_to_tile(self.position)));
                let y = (self.position.y - 1.0).max(landing.y).min(self.position.y);
                let target = Vec2::new(self.position.x, y);
                self.fall_target = Some(target);
                target
            }
        };

        self.step_toward(target, dt);
        if self.position == target {
            self.fall_target = None;
            return false;
        }
        true
    }

    fn finish_route(&mut self) {
        tracing::debug!(position = ?self.position, "route completed");
        self.path.clear();
        self.phase = MotionPhase::Idle;
    }

    fn step_toward(&mut self, target: Vec2, dt: Duration) {
        let offset = target - self.position;
        let distance = offset.length();
        let step = self.config.speed * dt.as_secs_f32();
        if distance <= step {
            self.position = target;
        } else {
            self.position += offset / distance * step;
        }
    }

    fn probe_ground(&self, map: &GridMap) -> bool {
        let local = self.position - map.origin();
        let probe = TileCoord::new(local.x.round() as i32, (local.y - 0.5).floor() as i32);
        (0..self.config.footprint.width() as i32).any(|dx| map.is_ground(probe.offset(dx, 0)))
    }

    /// Frames of jumping needed for the segment leaving waypoint `from`.
    ///
    /// Follows the route while it keeps climbing and stops at the first
    /// waypoint that drops below the running height or rests on ground.
    fn jump_frames_for_node(&self, map: &GridMap, from: usize) -> u32 {
        let (Some(origin), Some(next)) = (self.path.get(from), self.path.get(from + 1)) else {
            return 0;
        };
        if next.y() <= origin.y() || !self.on_ground {
            return 0;
        }

        let mut height = 1;
        for tile in &self.path[from + 1..] {
            let rise = tile.y() - origin.y();
            if rise >= height {
                height = rise;
            }
            if rise < height || map.is_supported(*tile, self.config.footprint) {
                return jump_frames(height);
            }
        }
        jump_frames(height)
    }
}
