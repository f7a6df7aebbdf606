/// GameState: everything the simulation owns.
///
/// ## World Grid
///
/// A `tiles_y × tiles_x` array of tile codes, indexed `[row][col]`.
/// Generated with every row strictly below the vertical midpoint filled
/// with Dirt and everything else sky. A viewport resize regenerates the
/// grid from scratch; blocks the player placed are gone afterwards.
///
/// Reads go through `get()`, which accepts any signed coordinate and
/// reports out-of-range cells as empty. Writes go through `set()`, which
/// ignores out-of-range coordinates.

use crate::config::PhysicsConfig;
use crate::domain::entity::Player;
use crate::domain::rules::MapView;
use crate::domain::tile::{BlockKind, Tile};

#[derive(Clone, Debug, PartialEq)]
pub struct WorldGrid {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl WorldGrid {
    /// Fresh world with the initial half-filled layout.
    pub fn generate(tiles_x: usize, tiles_y: usize) -> Self {
        let tiles = (0..tiles_y)
            .map(|row| {
                // row > tiles_y / 2, with real division
                let fill = if 2 * row > tiles_y { Tile::DIRT } else { Tile::EMPTY };
                vec![fill; tiles_x]
            })
            .collect();
        WorldGrid { tiles, width: tiles_x, height: tiles_y }
    }

    /// Grid dimensions that cover a viewport of the given size.
    /// Partial tiles at the right/bottom edges count as whole tiles.
    pub fn dims_for_viewport(
        width_px: usize,
        height_px: usize,
        tile_w: usize,
        tile_h: usize,
    ) -> (usize, usize) {
        let tiles_x = width_px.div_ceil(tile_w.max(1)).max(1);
        let tiles_y = height_px.div_ceil(tile_h.max(1)).max(1);
        (tiles_x, tiles_y)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile at (row, col); empty when outside the grid.
    #[inline]
    pub fn get(&self, row: i64, col: i64) -> Tile {
        self.view().tile_at(row, col)
    }

    /// Write a tile. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, row: i64, col: i64, tile: Tile) {
        if self.view().in_bounds(row, col) {
            self.tiles[row as usize][col as usize] = tile;
        }
    }

    #[inline]
    pub fn view(&self) -> MapView<'_> {
        MapView { tiles: &self.tiles, width: self.width, height: self.height }
    }

    /// Rows in display order, for rendering.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.iter().map(|r| r.as_slice())
    }
}

/// The complete state of a running game.
#[derive(Clone, Debug)]
pub struct GameState {
    pub grid: WorldGrid,
    pub player: Player,
    pub physics: PhysicsConfig,
    /// Block used by the next placement. Cycled by the UI.
    pub selected: BlockKind,
    pub tick: u64,
}

// ── Construction ──

impl GameState {
    pub fn new(tiles_x: usize, tiles_y: usize, physics: PhysicsConfig) -> Self {
        GameState {
            grid: WorldGrid::generate(tiles_x, tiles_y),
            player: Player::spawn(tiles_x, tiles_y),
            physics,
            selected: BlockKind::default(),
            tick: 0,
        }
    }

    /// Rebuild the grid for new dimensions. Placed blocks are discarded and
    /// the player returns to the spawn point at rest. A kept position could
    /// end up inside the new ground, with no floor below to land on.
    pub fn regenerate(&mut self, tiles_x: usize, tiles_y: usize) {
        self.grid = WorldGrid::generate(tiles_x, tiles_y);
        self.player = Player::spawn(self.grid.width(), self.grid.height());
    }

    /// Advance the selected block to the next kind.
    pub fn cycle_block(&mut self) -> BlockKind {
        self.selected = self.selected.next();
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_rows(g: &WorldGrid) -> Vec<usize> {
        g.rows()
            .enumerate()
            .filter(|(_, r)| r.iter().all(|t| *t == Tile::DIRT))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn initial_fill_rule_for_many_sizes() {
        for tiles_y in 1..=12usize {
            for tiles_x in 1..=5usize {
                let g = WorldGrid::generate(tiles_x, tiles_y);
                assert_eq!(g.width(), tiles_x);
                assert_eq!(g.height(), tiles_y);
                for row in 0..tiles_y {
                    let expected = if row as f64 > tiles_y as f64 / 2.0 {
                        Tile::DIRT
                    } else {
                        Tile::EMPTY
                    };
                    for col in 0..tiles_x {
                        assert_eq!(g.get(row as i64, col as i64), expected,
                            "{tiles_x}x{tiles_y} at ({row},{col})");
                    }
                }
            }
        }
    }

    #[test]
    fn ten_by_eight_example() {
        let g = WorldGrid::generate(10, 8);
        assert_eq!(filled_rows(&g), vec![5, 6, 7]);
        assert_eq!(g.get(4, 0), Tile::EMPTY);
    }

    #[test]
    fn odd_height_midpoint() {
        // 7 / 2 = 3.5 → rows 4, 5, 6 are ground
        let g = WorldGrid::generate(3, 7);
        assert_eq!(filled_rows(&g), vec![4, 5, 6]);
    }

    #[test]
    fn get_and_set_tolerate_out_of_range() {
        let mut g = WorldGrid::generate(3, 3);
        let before = g.clone();
        g.set(-1, 0, Tile::STONE);
        g.set(0, 3, Tile::STONE);
        g.set(3, 0, Tile::STONE);
        assert_eq!(g, before);
        assert_eq!(g.get(99, 99), Tile::EMPTY);
        assert_eq!(g.get(-5, 1), Tile::EMPTY);

        g.set(0, 1, Tile::GRASS);
        assert_eq!(g.get(0, 1), Tile::GRASS);
    }

    #[test]
    fn viewport_dims_round_up() {
        assert_eq!(WorldGrid::dims_for_viewport(80, 22, 2, 1), (40, 22));
        assert_eq!(WorldGrid::dims_for_viewport(81, 22, 2, 1), (41, 22));
        assert_eq!(WorldGrid::dims_for_viewport(1000, 700, 40, 40), (25, 18));
        assert_eq!(WorldGrid::dims_for_viewport(0, 0, 2, 1), (1, 1));
    }

    #[test]
    fn regenerate_discards_placed_blocks() {
        let mut s = GameState::new(10, 8, PhysicsConfig::default());
        s.grid.set(2, 2, Tile::STONE);
        s.regenerate(12, 6);
        assert_eq!(s.grid, WorldGrid::generate(12, 6));
        assert_eq!(s.grid.get(2, 2), Tile::EMPTY);
    }

    #[test]
    fn regenerate_respawns_player_at_rest() {
        let mut s = GameState::new(10, 8, PhysicsConfig::default());
        s.player.x = 9.0;
        s.player.y = 7.0;
        s.player.dy = 3.4;
        s.player.on_ground = true;
        s.regenerate(12, 6);
        assert_eq!(s.player, Player::spawn(12, 6));
        assert!(!s.player.on_ground);
        assert_eq!(s.player.dy, 0.0);
    }

    #[test]
    fn cycle_block_wraps() {
        let mut s = GameState::new(4, 4, PhysicsConfig::default());
        assert_eq!(s.selected, BlockKind::Dirt);
        assert_eq!(s.cycle_block(), BlockKind::Stone);
        assert_eq!(s.cycle_block(), BlockKind::Grass);
        assert_eq!(s.cycle_block(), BlockKind::Dirt);
    }
}
