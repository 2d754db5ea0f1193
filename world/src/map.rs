//! Dense tile map owned by the world crate.

use glam::Vec2;
use platform_nav_core::{Footprint, TileCoord, TileType, BORDER_THICKNESS};

/// Square tile grid with a solid two-tile border.
///
/// The map stores the classification of every tile together with a parallel
/// passability grid (`0` for blocks, `1` for everything else) that is rewritten
/// in the same operation as the classification. Queries outside the map never
/// fail: unknown space behaves like a solid block.
#[derive(Clone, Debug)]
pub struct GridMap {
    size: u32,
    origin: Vec2,
    tiles: Vec<TileType>,
    passability: Vec<u8>,
}

impl GridMap {
    /// Creates a map of `size × size` tiles whose bottom-left corner sits at `origin`.
    ///
    /// Every tile starts empty, then the outer two rings are forced to blocks.
    #[must_use]
    pub fn new(size: u32, origin: Vec2) -> Self {
        let side = usize::try_from(size).unwrap_or(0);
        let cell_count = side.checked_mul(side).unwrap_or(0);
        let mut map = Self {
            size,
            origin,
            tiles: vec![TileType::Empty; cell_count],
            passability: vec![TileType::Empty.passability(); cell_count],
        };

        for index in 0..cell_count {
            let tile = TileCoord::new((index % side) as i32, (index / side) as i32);
            if map.in_border(tile) {
                map.write(index, TileType::Block);
            }
        }

        map
    }

    /// Number of tiles along each side of the map.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// World-space position of tile `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Reports whether the tile lies inside the map.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.index(tile).is_some()
    }

    /// Classification of the tile, treating out-of-bounds space as a block.
    #[must_use]
    pub fn classify(&self, tile: TileCoord) -> TileType {
        self.index(tile)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(TileType::Block)
    }

    /// Reports whether the tile can be stood on: blocks and one-way platforms.
    #[must_use]
    pub fn is_ground(&self, tile: TileCoord) -> bool {
        matches!(self.classify(tile), TileType::Block | TileType::OneWay)
    }

    /// Reports whether the tile blocks movement, including out-of-bounds space.
    #[must_use]
    pub fn is_obstacle(&self, tile: TileCoord) -> bool {
        self.classify(tile) == TileType::Block
    }

    /// Reports whether the tile is a one-way platform. Out-of-bounds tiles are not.
    #[must_use]
    pub fn is_one_way(&self, tile: TileCoord) -> bool {
        self.index(tile)
            .and_then(|index| self.tiles.get(index))
            .map_or(false, |kind| *kind == TileType::OneWay)
    }

    /// Reports whether the tile holds anything, including out-of-bounds space.
    #[must_use]
    pub fn is_occupied(&self, tile: TileCoord) -> bool {
        self.classify(tile) != TileType::Empty
    }

    /// Reports whether [`GridMap::set_tile`] would modify the tile.
    #[must_use]
    pub fn is_editable(&self, tile: TileCoord) -> bool {
        self.contains(tile) && !self.in_border(tile)
    }

    /// Overwrites the classification of an interior tile.
    ///
    /// Tiles inside the border or outside the map are left untouched.
    pub fn set_tile(&mut self, tile: TileCoord, kind: TileType) {
        if !self.is_editable(tile) {
            return;
        }

        if let Some(index) = self.index(tile) {
            self.write(index, kind);
        }
    }

    /// Passability byte stored for the tile; out-of-bounds tiles read as `0`.
    #[must_use]
    pub fn passability(&self, tile: TileCoord) -> u8 {
        self.index(tile)
            .and_then(|index| self.passability.get(index).copied())
            .unwrap_or(0)
    }

    /// Dense passability bytes stored in row-major order, bottom row first.
    #[must_use]
    pub fn passability_grid(&self) -> &[u8] {
        &self.passability
    }

    /// Reports whether any tile in the inclusive rectangle spanned by the two
    /// corners is a block. Corner order does not matter.
    #[must_use]
    pub fn rectangle_has_block(&self, corner_a: TileCoord, corner_b: TileCoord) -> bool {
        let (min_x, max_x) = ordered(corner_a.x(), corner_b.x());
        let (min_y, max_y) = ordered(corner_a.y(), corner_b.y());

        (min_y..=max_y).any(|y| {
            (min_x..=max_x).any(|x| self.classify(TileCoord::new(x, y)) == TileType::Block)
        })
    }

    /// Reports whether any tile of column `x` between the two rows (inclusive,
    /// any order) is a block.
    #[must_use]
    pub fn stripe_has_block(&self, x: i32, y0: i32, y1: i32) -> bool {
        let (min_y, max_y) = ordered(y0, y1);
        (min_y..=max_y).any(|y| self.classify(TileCoord::new(x, y)) == TileType::Block)
    }

    /// Reports whether a footprint anchored at `anchor` overlaps no obstacle.
    #[must_use]
    pub fn fits(&self, anchor: TileCoord, footprint: Footprint) -> bool {
        footprint.tiles(anchor).all(|tile| !self.is_obstacle(tile))
    }

    /// Reports whether at least one column of the footprint rests on ground.
    #[must_use]
    pub fn is_supported(&self, anchor: TileCoord, footprint: Footprint) -> bool {
        footprint
            .tiles_below(anchor)
            .any(|tile| self.is_ground(tile))
    }

    /// Reports whether the footprint both fits at `anchor` and rests on ground.
    #[must_use]
    pub fn can_stand(&self, anchor: TileCoord, footprint: Footprint) -> bool {
        self.fits(anchor, footprint) && self.is_supported(anchor, footprint)
    }

    /// World-space position of the tile.
    #[must_use]
    pub fn tile_to_world(&self, tile: TileCoord) -> Vec2 {
        self.origin + Vec2::new(tile.x() as f32, tile.y() as f32)
    }

    /// Tile nearest to the world-space point; the inverse of [`GridMap::tile_to_world`].
    #[must_use]
    pub fn world_to_tile(&self, point: Vec2) -> TileCoord {
        let local = (point - self.origin).round();
        TileCoord::new(local.x as i32, local.y as i32)
    }

    fn in_border(&self, tile: TileCoord) -> bool {
        let far_edge = self.size as i32 - BORDER_THICKNESS;
        tile.x() < BORDER_THICKNESS
            || tile.y() < BORDER_THICKNESS
            || tile.x() >= far_edge
            || tile.y() >= far_edge
    }

    fn write(&mut self, index: usize, kind: TileType) {
        if let (Some(slot), Some(pass)) = (self.tiles.get_mut(index), self.passability.get_mut(index))
        {
            *slot = kind;
            *pass = kind.passability();
        }
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let x = u32::try_from(tile.x()).ok()?;
        let y = u32::try_from(tile.y()).ok()?;
        if x >= self.size || y >= self.size {
            return None;
        }

        let side = usize::try_from(self.size).ok()?;
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        row.checked_mul(side)?.checked_add(column)
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
