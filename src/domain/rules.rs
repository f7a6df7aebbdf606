/// Placement rules and the read-only map view.
///
/// Pure functions: they decide what is legal without mutating anything.
///
/// ## Placement Truth Table
/// ┌──────────────────────────────┬─────────┐
/// │ Condition                     │ Allow?  │
/// ├──────────────────────────────┼─────────┤
/// │ target column < 0 or ≥ width  │ DENY    │
/// │ target row < 0 or ≥ height    │ DENY    │
/// │ target tile code ≠ 0          │ DENY    │
/// │ Otherwise                     │ ALLOW   │
/// └──────────────────────────────┴─────────┘
///
/// The target is one tile beside the player in the facing direction, on
/// the row of the player's top edge (`floor(y + size - 1)`).

use super::entity::Player;
use super::tile::Tile;

/// Immutable view of the tile grid for rule and physics queries.
/// Indexed `tiles[row][col]`.
pub struct MapView<'a> {
    pub tiles: &'a [Vec<Tile>],
    pub width: usize,
    pub height: usize,
}

impl<'a> MapView<'a> {
    /// Tile at (row, col). Anything outside the grid reads as empty.
    #[inline]
    pub fn tile_at(&self, row: i64, col: i64) -> Tile {
        if self.in_bounds(row, col) {
            self.tiles[row as usize][col as usize]
        } else {
            Tile::EMPTY
        }
    }

    #[inline]
    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    #[inline]
    pub fn is_solid(&self, row: i64, col: i64) -> bool {
        self.tile_at(row, col).is_solid()
    }
}

/// The cell a block would be placed into, as (row, col). May lie outside
/// the grid; see `can_place`.
pub fn placement_target(player: &Player) -> (i64, i64) {
    let col = (player.x + player.facing.sign()).floor() as i64;
    let row = (player.y + player.size - 1.0).floor() as i64;
    (row, col)
}

/// Can a block be written at (row, col)? In bounds and exactly empty.
pub fn can_place(map: &MapView, row: i64, col: i64) -> bool {
    map.in_bounds(row, col) && map.tile_at(row, col).is_empty()
}
