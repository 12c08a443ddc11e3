//! Tile grid describing which floor cells block movement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single cell of the arena floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Whether the tile blocks movement.
    pub solid: bool,
}

impl Tile {
    /// Walkable floor tile.
    pub const OPEN: Tile = Tile { solid: false };
    /// Tile that blocks movement.
    pub const SOLID: Tile = Tile { solid: true };
}

/// Errors raised while assembling a [`TileMap`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TileMapError {
    /// The flat tile buffer does not hold `columns * rows` entries.
    #[error("tile buffer holds {actual} tiles but a {columns}x{rows} map needs {expected}")]
    LengthMismatch {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
        /// Number of tiles the dimensions require.
        expected: usize,
        /// Number of tiles supplied.
        actual: usize,
    },
}

/// Flat row-major tile array indexed `row * columns + column`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Creates a map of the given dimensions where every tile is walkable.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        let capacity = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![Tile::OPEN; capacity],
        }
    }

    /// Wraps an existing row-major tile buffer.
    pub fn from_tiles(columns: u32, rows: u32, tiles: Vec<Tile>) -> Result<Self, TileMapError> {
        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if tiles.len() != expected {
            return Err(TileMapError::LengthMismatch {
                columns,
                rows,
                expected,
                actual: tiles.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tiles,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Row-major tile storage.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Flat index of the tile at `(column, row)` when it lies inside the map.
    #[must_use]
    pub fn index(&self, column: i64, row: i64) -> Option<usize> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Reports whether the tile at `(column, row)` blocks movement.
    ///
    /// Coordinates outside the map are always solid.
    #[must_use]
    pub fn is_solid(&self, column: i64, row: i64) -> bool {
        self.index(column, row)
            .and_then(|index| self.tiles.get(index))
            .map_or(true, |tile| tile.solid)
    }

    /// Updates the solidity of a tile, returning `false` when it lies outside the map.
    pub fn set_solid(&mut self, column: u32, row: u32, solid: bool) -> bool {
        let Some(index) = self.index(i64::from(column), i64::from(row)) else {
            return false;
        };
        match self.tiles.get_mut(index) {
            Some(tile) => {
                tile.solid = solid;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_row_major() {
        let map = TileMap::open(5, 3);

        assert_eq!(map.index(0, 0), Some(0));
        assert_eq!(map.index(4, 0), Some(4));
        assert_eq!(map.index(1, 2), Some(11));
        assert_eq!(map.index(5, 0), None);
        assert_eq!(map.index(-1, 0), None);
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let map = TileMap::open(2, 2);

        assert!(!map.is_solid(1, 1));
        assert!(map.is_solid(2, 0));
        assert!(map.is_solid(0, -1));
        assert!(map.is_solid(i64::MAX, 0));
    }

    #[test]
    fn set_solid_marks_tile() {
        let mut map = TileMap::open(4, 4);

        assert!(map.set_solid(3, 1, true));
        assert!(map.is_solid(3, 1));
        assert!(!map.set_solid(4, 1, true));
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let error = TileMap::from_tiles(3, 3, vec![Tile::OPEN; 8]).unwrap_err();

        assert_eq!(
            error,
            TileMapError::LengthMismatch {
                columns: 3,
                rows: 3,
                expected: 9,
                actual: 8,
            }
        );
    }
}
