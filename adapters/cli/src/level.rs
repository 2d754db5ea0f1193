//! ASCII level loader.
//!
//! A level is a square block of glyphs with the top row first: `#` marks a
//! block, `-` a one-way platform, `.` open space, `S` the agent's start and `G`
//! the tile the agent is sent to. Blank lines and trailing whitespace are
//! ignored.

use platform_nav_core::{Command, Event, TileCoord, TileType};
use platform_nav_world::{apply, World};
use thiserror::Error;

/// Largest side length accepted for a level.
pub(crate) const MAX_LEVEL_SIZE: usize = 512;

/// Parsed level ready for simulation.
#[derive(Debug)]
pub(crate) struct Level {
    /// World holding the level's tile map.
    pub(crate) world: World,
    /// Tile marked with `S`.
    pub(crate) start: TileCoord,
    /// Tile marked with `G`.
    pub(crate) goal: TileCoord,
    /// Number of tile writes the level applied on top of the empty map.
    pub(crate) edits: usize,
}

/// Errors raised while reading a level description.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LevelError {
    /// The source held no non-blank rows.
    #[error("level contains no rows")]
    Empty,
    /// The level is taller than [`MAX_LEVEL_SIZE`].
    #[error("level has {rows} rows, at most {limit} are supported")]
    TooLarge { rows: usize, limit: usize },
    /// A row's width differs from the number of rows.
    #[error("row {row} is {width} tiles wide, expected {expected} to keep the level square")]
    NotSquare {
        row: usize,
        width: usize,
        expected: usize,
    },
    /// A character outside the level alphabet.
    #[error("unknown glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        glyph: char,
        row: usize,
        column: usize,
    },
    /// A required marker never appeared.
    #[error("level has no {0:?} marker")]
    MissingMarker(char),
    /// A marker appeared twice.
    #[error("level has more than one {0:?} marker")]
    DuplicateMarker(char),
}

/// Parses `source` into a world plus the start and goal markers.
pub(crate) fn parse(source: &str) -> Result<Level, LevelError> {
    let rows: Vec<&str> = source
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let size = rows.len();
    if size == 0 {
        return Err(LevelError::Empty);
    }
    if size > MAX_LEVEL_SIZE {
        return Err(LevelError::TooLarge {
            rows: size,
            limit: MAX_LEVEL_SIZE,
        });
    }

    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ConfigureMap { size: size as u32 },
        &mut events,
    );

    let mut start = None;
    let mut goal = None;
    for (row, line) in rows.iter().enumerate() {
        let width = line.chars().count();
        if width != size {
            return Err(LevelError::NotSquare {
                row: row + 1,
                width,
                expected: size,
            });
        }

        let y = (size - 1 - row) as i32;
        for (column, glyph) in line.chars().enumerate() {
            let tile = TileCoord::new(column as i32, y);
            let kind = match glyph {
                '#' => TileType::Block,
                '-' => TileType::OneWay,
                '.' => TileType::Empty,
                'S' => {
                    place_marker(&mut start, tile, glyph)?;
                    TileType::Empty
                }
                'G' => {
                    place_marker(&mut goal, tile, glyph)?;
                    TileType::Empty
                }
                other => {
                    return Err(LevelError::UnknownGlyph {
                        glyph: other,
                        row: row + 1,
                        column: column + 1,
                    })
                }
            };
            if kind != TileType::Empty {
                apply(&mut world, Command::SetTile { tile, kind }, &mut events);
            }
        }
    }

    let edits = events
        .iter()
        .filter(|event| matches!(event, Event::TileChanged { .. }))
        .count();

    Ok(Level {
        world,
        start: start.ok_or(LevelError::MissingMarker('S'))?,
        goal: goal.ok_or(LevelError::MissingMarker('G'))?,
        edits,
    })
}

fn place_marker(
    slot: &mut Option<TileCoord>,
    tile: TileCoord,
    glyph: char,
) -> Result<(), LevelError> {
    if slot.replace(tile).is_some() {
        return Err(LevelError::DuplicateMarker(glyph));
    }
    Ok(())
}
