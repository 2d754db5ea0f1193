#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the platform navigation engine.

mod map;

use glam::Vec2;
use platform_nav_core::{Command, Event, TileType, DEFAULT_MAP_SIZE};

pub use map::GridMap;

/// Represents the authoritative level state: the tile map agents move on.
#[derive(Clone, Debug)]
pub struct World {
    map: GridMap,
}

impl World {
    /// Creates a world holding an empty default-sized map anchored at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::with_origin(Vec2::ZERO)
    }

    /// Creates a world whose map's bottom-left corner sits at `origin`.
    #[must_use]
    pub fn with_origin(origin: Vec2) -> Self {
        Self {
            map: GridMap::new(DEFAULT_MAP_SIZE, origin),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Every tile write that takes effect is announced with [`Event::TileChanged`];
/// edits aimed at the border or outside the map are dropped without an event.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMap { size } => {
            world.map = GridMap::new(size, world.map.origin());
            out_events.push(Event::MapConfigured { size });
        }
        Command::SetTile { tile, kind } => {
            if !world.map.is_editable(tile) {
                return;
            }

            world.map.set_tile(tile, kind);
            out_events.push(Event::TileChanged { tile, kind });
        }
        Command::PaintTile { tile, kind } => {
            if !world.map.is_editable(tile) {
                return;
            }

            let kind = if world.map.is_occupied(tile) {
                TileType::Empty
            } else {
                kind
            };
            world.map.set_tile(tile, kind);
            out_events.push(Event::TileChanged { tile, kind });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use platform_nav_core::{TileCoord, TileType};

    use super::{GridMap, World};

    /// Provides read-only access to the world's tile map.
    #[must_use]
    pub fn map(world: &World) -> &GridMap {
        &world.map
    }

    /// Classification of a single tile.
    #[must_use]
    pub fn tile(world: &World, tile: TileCoord) -> TileType {
        world.map.classify(tile)
    }

    /// Walks down from `tile` to the first ground tile and returns the tile
    /// resting on top of it.
    ///
    /// Out-of-bounds space counts as ground, so the walk always terminates.
    #[must_use]
    pub fn landing_tile(world: &World, tile: TileCoord) -> TileCoord {
        landing_tile_on(&world.map, tile)
    }

    /// Same as [`landing_tile`] for callers that only hold the map.
    #[must_use]
    pub fn landing_tile_on(map: &GridMap, tile: TileCoord) -> TileCoord {
        let mut probe = tile;
        while !map.is_ground(probe) {
            probe = probe.below();
        }
        probe.above()
    }
}
