#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the platform navigation engine.
//!
//! This crate defines the value types and the message surface that connect
//! adapters, the authoritative world and the navigation systems. Adapters
//! submit [`Command`] values describing map edits, the world executes them via
//! its `apply` entry point and then broadcasts [`Event`] values so renderers can
//! mirror the tile layout. Systems borrow the world's map read-only to plan and
//! follow routes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length, in tiles, of a freshly created map.
pub const DEFAULT_MAP_SIZE: u32 = 20;

/// Number of solid rings that surround every map and can never be edited.
pub const BORDER_THICKNESS: i32 = 2;

/// Largest jump height whose frame count is tabulated explicitly.
pub const MAX_TABULATED_RISE: i32 = 6;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the map as an empty square of the provided size.
    ConfigureMap {
        /// Number of tiles along each side of the square map.
        size: u32,
    },
    /// Overwrites the classification of a single tile.
    SetTile {
        /// Tile targeted by the edit.
        tile: TileCoord,
        /// Classification the tile should take.
        kind: TileType,
    },
    /// Toggles a tile the way an editor brush does: empty tiles take `kind`,
    /// occupied tiles are cleared.
    PaintTile {
        /// Tile targeted by the brush.
        tile: TileCoord,
        /// Classification applied when the tile is currently empty.
        kind: TileType,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the map was rebuilt with the provided size.
    MapConfigured {
        /// Number of tiles along each side of the square map.
        size: u32,
    },
    /// Notifies renderers that a tile changed classification.
    TileChanged {
        /// Tile whose classification was written.
        tile: TileCoord,
        /// Classification now stored for the tile.
        kind: TileType,
    },
}

/// Location of a single tile expressed as signed column and row indices.
///
/// Rows grow upward, so gravity pulls toward decreasing `y`. The coordinates
/// are signed so probes just outside the map remain representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the tile displaced by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Tile directly beneath this one.
    #[must_use]
    pub const fn below(self) -> Self {
        self.offset(0, -1)
    }

    /// Tile directly above this one.
    #[must_use]
    pub const fn above(self) -> Self {
        self.offset(0, 1)
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Classification stored for every tile of the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Open space the agent can occupy.
    #[default]
    Empty,
    /// Solid tile that blocks movement from every side.
    Block,
    /// Platform that supports standing from above but never blocks movement.
    OneWay,
}

impl TileType {
    /// Encoding written into the passability grid: `0` for blocks, `1` otherwise.
    #[must_use]
    pub const fn passability(self) -> u8 {
        match self {
            Self::Block => 0,
            Self::Empty | Self::OneWay => 1,
        }
    }
}

/// Width and height, in tiles, of the space an agent's body occupies.
///
/// Both dimensions are clamped to `1..=3`. A footprint anchored at a tile
/// extends to the right and upward from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawFootprint")]
pub struct Footprint {
    width: u32,
    height: u32,
}

impl Footprint {
    /// Smallest supported footprint dimension.
    pub const MIN_EXTENT: u32 = 1;
    /// Largest supported footprint dimension.
    pub const MAX_EXTENT: u32 = 3;

    /// Creates a footprint, clamping both dimensions into the supported range.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: clamp_extent(width),
            height: clamp_extent(height),
        }
    }

    /// Single-tile footprint.
    #[must_use]
    pub const fn unit() -> Self {
        Self::new(1, 1)
    }

    /// Width of the footprint in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the footprint in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Iterates over the tiles covered by the footprint anchored at `anchor`.
    pub fn tiles(self, anchor: TileCoord) -> impl Iterator<Item = TileCoord> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |dy| (0..width).map(move |dx| anchor.offset(dx, dy)))
    }

    /// Iterates over the tiles directly beneath the footprint anchored at `anchor`.
    pub fn tiles_below(self, anchor: TileCoord) -> impl Iterator<Item = TileCoord> {
        let below = anchor.below();
        (0..self.width as i32).map(move |dx| below.offset(dx, 0))
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::unit()
    }
}

#[derive(Deserialize)]
struct RawFootprint {
    width: u32,
    height: u32,
}

impl From<RawFootprint> for Footprint {
    fn from(raw: RawFootprint) -> Self {
        Self::new(raw.width, raw.height)
    }
}

const fn clamp_extent(value: u32) -> u32 {
    if value < Footprint::MIN_EXTENT {
        Footprint::MIN_EXTENT
    } else if value > Footprint::MAX_EXTENT {
        Footprint::MAX_EXTENT
    } else {
        value
    }
}

/// Ordered waypoints of a planned route, starting at the tile the search began
/// from and ending at the goal.
pub type Path = Vec<TileCoord>;

/// Per-agent settings supplied when an agent is spawned.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Tiles occupied by the agent's body.
    pub footprint: Footprint,
    /// Tallest rise, in tiles, the agent can clear with a single jump.
    pub max_jump_height: u32,
    /// Movement speed measured in tiles per second.
    pub speed: f32,
    /// Residual distance, in tiles, under which an axis counts as reached.
    pub position_error: f32,
    /// Whether the agent falls through one-way platforms.
    pub ignores_one_way: bool,
}

impl AgentConfig {
    /// Default jump height measured in tiles.
    pub const DEFAULT_MAX_JUMP_HEIGHT: u32 = 5;
    /// Default movement speed measured in tiles per second.
    pub const DEFAULT_SPEED: f32 = 6.0;
    /// Default arrival tolerance measured in tiles.
    pub const DEFAULT_POSITION_ERROR: f32 = 0.99;

    /// Checks that the movement settings describe an agent that can make progress.
    pub fn validate(&self) -> Result<(), AgentConfigError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(AgentConfigError::Speed(self.speed));
        }
        if !(self.position_error.is_finite() && self.position_error > 0.0) {
            return Err(AgentConfigError::PositionError(self.position_error));
        }
        Ok(())
    }
}

/// Settings rejected by [`AgentConfig::validate`].
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum AgentConfigError {
    /// Speed must be a positive finite number of tiles per second.
    #[error("speed must be positive and finite, got {0}")]
    Speed(f32),
    /// Arrival tolerance must be a positive finite distance.
    #[error("position_error must be positive and finite, got {0}")]
    PositionError(f32),
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            footprint: Footprint::unit(),
            max_jump_height: Self::DEFAULT_MAX_JUMP_HEIGHT,
            speed: Self::DEFAULT_SPEED,
            position_error: Self::DEFAULT_POSITION_ERROR,
            ignores_one_way: false,
        }
    }
}

/// Route-following state of an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MotionPhase {
    /// No route is active.
    #[default]
    Idle,
    /// The agent is travelling toward the waypoint at index `node`.
    Following {
        /// Index of the waypoint currently being approached.
        node: usize,
    },
}

/// Number of frames a climb of `rise` tiles takes to execute.
///
/// The progression is deliberately super-linear to model an arcing jump:
/// `1, 2, 6, 9, 15, 21` frames for rises of one to six tiles and thirty frames
/// for anything taller. Non-positive rises need no jump at all.
#[must_use]
pub const fn jump_frames(rise: i32) -> u32 {
    match rise {
        i32::MIN..=0 => 0,
        1 => 1,
        2 => 2,
        3 => 6,
        4 => 9,
        5 => 15,
        6 => 21,
        _ => 30,
    }
}
