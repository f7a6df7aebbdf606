/// Tile codes and the selectable block kinds.
///
/// A tile is a small integer code. 0 is sky; every other code is solid,
/// whether or not the palette knows a color for it.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Tile(pub u8);

impl Tile {
    pub const EMPTY: Tile = Tile(0);
    pub const DIRT: Tile = Tile(1);
    pub const STONE: Tile = Tile(2);
    pub const GRASS: Tile = Tile(3);

    /// Does this tile block vertical movement and placement?
    #[inline]
    pub fn is_solid(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Blocks the player can build with. Cycles Dirt → Stone → Grass → Dirt.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BlockKind {
    #[default]
    Dirt,
    Stone,
    Grass,
}

impl BlockKind {
    pub fn tile(self) -> Tile {
        match self {
            BlockKind::Dirt => Tile::DIRT,
            BlockKind::Stone => Tile::STONE,
            BlockKind::Grass => Tile::GRASS,
        }
    }

    pub fn next(self) -> BlockKind {
        match self {
            BlockKind::Dirt => BlockKind::Stone,
            BlockKind::Stone => BlockKind::Grass,
            BlockKind::Grass => BlockKind::Dirt,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Dirt => "Dirt",
            BlockKind::Stone => "Stone",
            BlockKind::Grass => "Grass",
        }
    }
}
