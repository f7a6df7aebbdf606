/// Events emitted by the simulation.
/// The presentation layer consumes these for sound and logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    Landed,
    LeftGround,
    BlockPlaced { row: i64, col: i64, code: u8 },
    BlockCycled { code: u8 },
    WorldRegenerated { tiles_x: usize, tiles_y: usize },
}
